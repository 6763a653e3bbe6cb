fn main() -> std::process::ExitCode {
    png_jpg_converter_lib::run()
}
