use std::fmt::Display;

use miette::miette;

#[derive(Debug)]
pub enum Error {
    /// The job cannot start as described. Raised before any external program runs.
    Config(miette::Report),

    /// The scratch area could not be created, listed or removed.
    Resource(miette::Report),

    /// The downloader reported the source as unavailable
    UnavailableStream,

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Miette(miette::Report::msg(err))
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(err) => err.wrap_err("Invalid job configuration"),
            Error::Resource(err) => err.wrap_err("Scratch area failure"),
            Error::UnavailableStream => miette!("Unavailable stream"),
            Error::Miette(err) => err,
        }
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Config(report) => Error::Config(report.wrap_err(f())),
            Error::Resource(report) => Error::Resource(report.wrap_err(f())),
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }

    /// Reclassify any error as a scratch area failure
    pub fn into_resource(self) -> Error {
        match self {
            Error::Resource(report) | Error::Config(report) | Error::Miette(report) => {
                Error::Resource(report)
            }
            Error::UnavailableStream => Error::Resource(miette!("Unavailable stream")),
        }
    }

    /// Render the error and its causes on a single line, for reports
    pub fn to_reason(&self) -> String {
        match self {
            Error::Config(report) | Error::Resource(report) | Error::Miette(report) => report
                .chain()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(": "),
            Error::UnavailableStream => "Unavailable stream".to_owned(),
        }
    }
}

pub fn err_msg<D: Display>(msg: D) -> Error {
    Error::Miette(miette!("{msg}"))
}

pub fn config_err<D: Display>(msg: D) -> Error {
    Error::Config(miette!("{msg}"))
}

pub fn bail<T, D: Display>(msg: D) -> Result<T> {
    Err(err_msg(msg))
}

pub type Result<T> = std::result::Result<T, Error>;
