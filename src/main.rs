fn main() {
    ebnfkit::cli::run();
}
