fn main() {
    build_util::expose_m_profile();
}
