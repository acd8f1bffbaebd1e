use miette::{IntoDiagnostic, Result, WrapErr};
use owo_colors::{OwoColorize, Style};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, UtcOffset};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    FmtSubscriber,
};

const TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Initialize the logging system, writing to stderr.
///
/// Must be called before spawning threads, as the local time offset
/// cannot be read safely afterwards.
pub fn init_logging(level: Level) -> Result<()> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let subscriber = FmtSubscriber::builder()
        .event_format(LineFormat { offset })
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .into_diagnostic()
        .wrap_err("Setting default subscriber failed")
}

/// One line per event: `12:00:00.000 INF [worker] message`.
/// Debug and trace events also show where they come from.
struct LineFormat {
    offset: UtcOffset,
}

/// Short fixed-width tag of a level, with the style to print it with
fn level_tag(level: Level) -> (&'static str, Style) {
    match level {
        Level::ERROR => ("ERR", Style::new().red().bold()),
        Level::WARN => ("WRN", Style::new().yellow()),
        Level::INFO => ("INF", Style::new().green()),
        Level::DEBUG => ("DBG", Style::new().blue()),
        _ => ("TRC", Style::new().dimmed()),
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let ansi = writer.has_ansi_escapes();

        let now = OffsetDateTime::now_utc()
            .to_offset(self.offset)
            .format(TIME_FORMAT)
            .map_err(|_| std::fmt::Error)?;

        let (tag, style) = level_tag(*metadata.level());
        let thread = std::thread::current();
        let thread = thread.name().unwrap_or("?");

        if ansi {
            write!(writer, "{} {} [{}] ", now.dimmed(), tag.style(style), thread.cyan())?;
        } else {
            write!(writer, "{now} {tag} [{thread}] ")?;
        }

        if *metadata.level() >= Level::DEBUG {
            write!(writer, "{}: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
