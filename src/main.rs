//! ioduel CLI entry point

use anyhow::Result;
use ioduel::config::default_grid;
use ioduel::engine::Direction;
use ioduel::output::print_result;
use ioduel::target::PathProvider;
use ioduel::workload::{ReadWorkload, WriteWorkload};

fn main() -> Result<()> {
    println!("ioduel v{}", env!("CARGO_PKG_VERSION"));
    println!("Sync pool vs completion-callback positional IO latency");
    println!();

    let paths = PathProvider::default();

    for config in default_grid() {
        config.validate()?;

        let writer = WriteWorkload::new(config);
        let (write_result, populated) = writer.invoke(&paths)?;

        let reader = ReadWorkload::new(config, &populated);
        let read_result = reader.invoke(&paths)?;

        print_result(Direction::Write, &config, &write_result);
        print_result(Direction::Read, &config, &read_result);
        println!();
    }

    Ok(())
}
