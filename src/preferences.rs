use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cli::Args,
    job::{Conversion, Job},
    result::{config_err, Result},
    types::{Extension, Options},
};

/// Extension value meaning "keep the downloaded files as they are"
const DEFAULT_EXTENSION: &str = "default";

/// Last used values, remembered between runs
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// URLs of the last run, one per line
    pub urls: String,
    pub output_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub download_params: String,
    pub input_params: String,
    pub output_params: String,
}

impl Preferences {
    /// Location of the preferences file in the user configuration directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yoink").join("preferences.json"))
    }

    /// Read the preferences file.
    ///
    /// A missing or unreadable file is not an error: the default preferences are used instead.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }

        let res = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .build()
            .and_then(|config| config.try_deserialize::<Self>());

        match res {
            Ok(prefs) => {
                debug!("Preferences loaded from {}", path.display());
                prefs
            }
            Err(err) => {
                warn!(
                    "Ignoring invalid preferences file {}: {err}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> miette::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .wrap_err("Could not create the preferences directory")?;
        }

        let json = serde_json::to_string_pretty(self)
            .into_diagnostic()
            .wrap_err("Could not serialize the preferences")?;

        std::fs::write(path, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not write {}", path.display()))?;

        debug!("Preferences saved to {}", path.display());
        Ok(())
    }

    /// Overwrite the remembered values with the ones given on the command line
    pub fn merge_args(&self, args: &Args) -> Self {
        let pick = |arg: &Option<String>, pref: &String| arg.clone().unwrap_or_else(|| pref.clone());

        Self {
            urls: args.urls.join("\n"),
            output_dir: args.out.clone().or_else(|| self.output_dir.clone()),
            extension: args.ext.clone().or_else(|| self.extension.clone()),
            download_params: pick(&args.dl_params, &self.download_params),
            input_params: pick(&args.input_params, &self.input_params),
            output_params: pick(&args.output_params, &self.output_params),
        }
    }

    /// Build the job described by these values.
    ///
    /// Fails on an invalid extension or malformed parameters.
    /// The destination itself is checked when the job runs.
    pub fn to_job(&self) -> Result<Job> {
        Ok(Job {
            download_options: parse_options(&self.download_params, "downloader parameters")?,
            extension: self.extension()?,
            input_options: parse_options(&self.input_params, "converter input parameters")?,
            output_options: parse_options(&self.output_params, "converter output parameters")?,
            ..Job::new(Job::parse_urls(&self.urls), self.output_dir())
        })
    }

    /// Build the conversion of the output directory files matching `pattern`.
    ///
    /// Unlike a job, a conversion needs a target extension.
    pub fn to_conversion(&self, pattern: &str) -> Result<Conversion> {
        let extension = self
            .extension()?
            .ok_or_else(|| config_err("Converting files needs a target extension"))?;

        Ok(Conversion {
            input_options: parse_options(&self.input_params, "converter input parameters")?,
            output_options: parse_options(&self.output_params, "converter output parameters")?,
            ..Conversion::new(self.output_dir(), pattern, extension)?
        })
    }

    fn extension(&self) -> Result<Option<Extension>> {
        match self.extension.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(ext) if ext.eq_ignore_ascii_case(DEFAULT_EXTENSION) => Ok(None),
            Some(ext) => ext
                .parse::<Extension>()
                .map(Some)
                .map_err(|err| config_err(format!("Invalid extension: {err}"))),
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn parse_options(text: &str, what: &str) -> Result<Options> {
    Options::from_json(text).map_err(|err| err.wrap_err_with(|| format!("Invalid {what}")))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use indoc::indoc;

    use super::*;
    use crate::result::Error;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("preferences.json"));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{ \"output_dir\": ").unwrap();

        assert_eq!(Preferences::load(&path), Preferences::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(
            &path,
            indoc! {r#"
                {
                    "output_dir": "/music",
                    "extension": "mp3"
                }
            "#},
        )
        .unwrap();

        let prefs = Preferences::load(&path);
        assert_eq!(prefs.output_dir, Some(PathBuf::from("/music")));
        assert_eq!(prefs.extension.as_deref(), Some("mp3"));
        assert_eq!(prefs.download_params, "");
    }

    #[test]
    fn saved_preferences_are_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let prefs = Preferences {
            urls: "https://example.com/a\nhttps://example.com/b".to_owned(),
            output_dir: Some(dir.path().to_path_buf()),
            extension: Some("mkv".to_owned()),
            download_params: r#"["-f", "best"]"#.to_owned(),
            input_params: String::new(),
            output_params: r#"{"-c:v": "copy"}"#.to_owned(),
        };

        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path), prefs);
    }

    #[test]
    fn command_line_overrides_preferences() {
        let prefs = Preferences {
            urls: "https://example.com/old".to_owned(),
            output_dir: Some(PathBuf::from("/music")),
            extension: Some("mp3".to_owned()),
            download_params: r#"["-f", "bestaudio"]"#.to_owned(),
            ..Preferences::default()
        };
        let args =
            Args::try_parse_from(["yoink", "https://example.com/new", "--ext", "default"]).unwrap();

        let merged = prefs.merge_args(&args);
        assert_eq!(merged.urls, "https://example.com/new");
        assert_eq!(merged.output_dir, Some(PathBuf::from("/music")));
        assert_eq!(merged.extension.as_deref(), Some("default"));
        assert_eq!(merged.download_params, r#"["-f", "bestaudio"]"#);

        let job = merged.to_job().unwrap();
        assert_eq!(job.urls, ["https://example.com/new"]);
        assert_eq!(job.extension, None);
        assert_eq!(job.download_options.to_vec(), ["-f", "bestaudio"]);
        assert_eq!(job.destination, PathBuf::from("/music"));
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        let bad_params = Preferences {
            download_params: "{not json".to_owned(),
            ..Preferences::default()
        };
        assert!(matches!(bad_params.to_job(), Err(Error::Config(_))));

        let bad_ext = Preferences {
            extension: Some("a/b".to_owned()),
            ..Preferences::default()
        };
        assert!(matches!(bad_ext.to_job(), Err(Error::Config(_))));
    }

    #[test]
    fn conversion_needs_an_extension() {
        let prefs = Preferences {
            output_dir: Some(PathBuf::from("/music")),
            extension: Some("default".to_owned()),
            ..Preferences::default()
        };
        assert!(matches!(prefs.to_conversion("*.webm"), Err(Error::Config(_))));

        let prefs = Preferences {
            extension: Some(".ogg".to_owned()),
            output_params: r#"["-q:a", "6"]"#.to_owned(),
            ..prefs
        };
        let conversion = prefs.to_conversion("*.webm").unwrap();
        assert_eq!(conversion.directory, PathBuf::from("/music"));
        assert_eq!(conversion.extension.to_string(), "ogg");
        assert_eq!(conversion.output_options.to_vec(), ["-q:a", "6"]);
        assert!(conversion.pattern.is_match("Song.webm"));
    }
}
