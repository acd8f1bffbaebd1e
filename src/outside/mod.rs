mod command;
mod ffmpeg;
#[cfg(test)]
pub mod stub;
mod ytdl;

pub use ffmpeg::{Ffmpeg, MediaConverter};
pub use ytdl::{MediaDownloader, Ytdl};
