use shadow_rs::ShadowBuilder;

fn main() {
    // build metadata behind `coursereg --version`
    ShadowBuilder::builder()
        .build()
        .expect("shadow-rs build metadata");
}
