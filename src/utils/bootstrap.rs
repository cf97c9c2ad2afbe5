pub fn show_start_message(config: &crate::Config)
{
        if !config.show_start_message
        {
                return;
        }

        let paintbox_string = r#"

    ░███████    ░███    ░██████░███    ░██░██████████░████████    ░██████   ░██    ░██
    ░██   ░██  ░██░██     ░██  ░████   ░██    ░██    ░██    ░██  ░██   ░██   ░██  ░██
    ░██   ░██ ░██  ░██    ░██  ░██░██  ░██    ░██    ░██    ░██ ░██     ░██   ░██░██
    ░███████  ░█████████  ░██  ░██ ░██ ░██    ░██    ░████████  ░██     ░██    ░███
    ░██       ░██    ░██  ░██  ░██  ░██░██    ░██    ░██    ░██ ░██     ░██   ░██░██
    ░██       ░██    ░██  ░██  ░██   ░████    ░██    ░██    ░██  ░██   ░██   ░██  ░██
    ░██       ░██    ░██ ░██████░██    ░███    ░██    ░████████    ░██████   ░██    ░██

 Native window + GPU surface shell built with winit, wgpu and Rust.
(ASCII art generated @ https://www.patorjk.com/software/taag/
[font: Terrace])

            "#;

        log::info!("{paintbox_string}");

        log::info!(
                "Window `{}` ({}x{}), render mode {:?}, drivers {:?}",
                config.window.title,
                config.window.width,
                config.window.height,
                config.render.mode,
                config.render.drivers
        );
}

/// Initializes `env_logger` once. `RUST_LOG` overrides the default `info`
/// filter.
pub fn config_logging()
{
        let initialized = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();

        if initialized.is_ok()
        {
                log::info!("Running on native.");
        }
}

pub fn create_config() -> crate::Config
{
        crate::Config::load().unwrap_or_else(|err| {
                log::warn!("Failed to load config: {err}, falling back to default");
                crate::Config::default()
        })
}
