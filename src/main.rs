fn main() {
    if let Err(err) = quizbooth_lib::run() {
        eprintln!("quizbooth: {err}");
        std::process::exit(1);
    }
}
