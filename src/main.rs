fn main() -> Result<(), Box<dyn std::error::Error>> {
    sewbot::cli::main()
}
