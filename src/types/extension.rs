use std::{
    ffi::{OsStr, OsString},
    fmt::Display,
    path::Path,
    str::FromStr,
};

/// Target file extension of a conversion, stored without its leading dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension(String);

impl Extension {
    /// Return the extension with the leading dot.
    /// e.g. ".ext"
    pub fn with_dot(&self) -> String {
        format!(".{}", self.0)
    }

    /// Name of the result file for an acquired file.
    ///
    /// With an extension, the acquired file stem followed by the extension.
    /// Without one, the file name is kept as-is.
    pub fn result_name(file_name: &OsStr, extension: Option<&Extension>) -> OsString {
        match extension {
            Some(ext) => {
                let mut name = Path::new(file_name)
                    .file_stem()
                    .unwrap_or(file_name)
                    .to_os_string();
                name.push(ext.with_dot());
                name
            }
            None => file_name.to_os_string(),
        }
    }
}

impl FromStr for Extension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim();
        let ext = ext.strip_prefix('.').unwrap_or(ext);

        if ext.is_empty() {
            Err("Extension is empty".to_owned())
        } else if ext.contains(['/', '\\']) {
            Err(format!("Extension '{ext}' contains a path separator"))
        } else if ext.contains('.') || ext.contains(char::is_whitespace) {
            Err(format!("Extension '{ext}' must be a single word without dots"))
        } else {
            Ok(Self(ext.to_owned()))
        }
    }
}

impl Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
