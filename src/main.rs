fn main() {
    if let Err(e) = salinity_convert::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
