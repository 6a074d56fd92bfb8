use bevy_gen_frame::{launch, FrameConfig, TimberFrame};

fn main() {
    let config = match FrameConfig::load_or_default("timber_frame.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}, using defaults");
            FrameConfig::default()
        }
    };
    launch(config.with_fallback_host("timberframe"), TimberFrame::default());
}
