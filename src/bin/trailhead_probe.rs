fn main() -> anyhow::Result<()> {
    trailhead::cli::run_cli()
}
