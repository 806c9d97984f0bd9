mod cli;
mod driver;
mod latency;
mod phases;
mod report;

use clap::Parser;
use mdio_core::backend::BackendRegistry;
use mdio_core::groupcomm::GroupComm;

use cli::CliArgs;

fn main() {
    let universe = mpi::initialize().expect("failed to initialize MPI");
    let comm = GroupComm::new(universe.world());

    let raw_args: Vec<String> = std::env::args().collect();
    let (filtered_args, backend_options) = mdio_core::extract_backend_options(raw_args);
    let args = CliArgs::parse_from(filtered_args);
    let cfg = args.into_config();

    let mut registry = BackendRegistry::new();
    registry.register("posix", || Box::new(mdio_backend_posix::PosixBackend::new(".")));
    registry.register("dummy", || Box::new(mdio_backend_dummy::DummyBackend::new()));

    let code = driver::run(&cfg, &comm, &registry, &backend_options);
    std::process::exit(code);
}
