use vergen::{
    vergen,
    Config,
    ShaKind,
};

fn main() {
    let mut config = Config::default();
    *config.git_mut().sha_kind_mut() = ShaKind::Short;

    if let Err(e) = vergen(config) {
        println!("cargo:warning=build metadata unavailable: {}", e);
    }
}
