/// Terminal logger for tests and tools. Safe to call more than once
pub fn init_logger() {
    let _ = simplelog::TermLogger::init(
        log::LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .add_filter_ignore_str("sqlx")
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}
