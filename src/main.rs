use anyhow::Result;

fn main() -> Result<()> {
    source_sweep::run_cli()
}
