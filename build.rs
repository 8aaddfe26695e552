fn main() {
    // Python resolves its own symbols when it loads the extension module
    pyo3_build_config::add_extension_module_link_args();
}
