use bevy_gen_frame::{launch, FrameConfig, RigidFrame};

fn main() {
    let config = match FrameConfig::load_or_default("rc_frame.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}, using defaults");
            FrameConfig::default()
        }
    };
    launch(config.with_fallback_host("rcframe"), RigidFrame::default());
}
