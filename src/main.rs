fn main() {
    xr_blockout::main();
}
