/// Log an error with its whole chain of sources, optionally followed by extra
/// fields and a message.
#[macro_export]
macro_rules! tracing_report {
    ($error:expr) => {
        tracing::error!(err = %snafu::Report::from_error(&$error))
    };
    ($error:expr, $($rest:tt)+) => {
        tracing::error!(err = %snafu::Report::from_error(&$error), $($rest)+)
    };
}
