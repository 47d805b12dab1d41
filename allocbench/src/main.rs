fn main() -> anyhow::Result<()> {
    allocbench::run()
}
