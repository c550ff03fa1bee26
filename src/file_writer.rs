// src/file_writer.rs

use crate::emitter::{Schema, legacy, modern};
use crate::error::{Error, Result};
use log::info;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Somewhere named library entries can be stored.
pub trait LibraryStore {
    fn exists(&self, name: &str) -> Result<bool>;
    /// Stores `content` under `name`. Fails with `AlreadyExists` when the
    /// entry is present and `overwrite` is false.
    fn write(&self, name: &str, content: &str, overwrite: bool) -> Result<()>;
}

/// A single symbol library file holding many entries.
pub struct SymbolLibrary {
    pub path: PathBuf,
    pub schema: Schema,
}

impl SymbolLibrary {
    /// `{dir}/{library}.lib` or `{dir}/{library}.kicad_sym`.
    pub fn new(dir: &Path, library: &str, schema: Schema) -> Self {
        SymbolLibrary {
            path: dir.join(format!("{}.{}", library, schema.symbol_extension())),
            schema,
        }
    }

    fn header(&self) -> String {
        match self.schema {
            Schema::Legacy => legacy::SYMBOL_LIB_HEADER.to_string(),
            Schema::Modern => modern::symbol_lib_header(),
        }
    }

    fn footer(&self) -> &'static str {
        match self.schema {
            Schema::Legacy => legacy::SYMBOL_LIB_FOOTER,
            Schema::Modern => modern::SYMBOL_LIB_FOOTER,
        }
    }

    /// Matches one whole entry, including its trailing newline.
    fn entry_pattern(&self, name: &str) -> Result<Regex> {
        let pattern = match self.schema {
            Schema::Legacy => {
                let name = regex::escape(name);
                format!(r"(?ms)(?:^#\n# {name}\n#\n)?^DEF {name} .*?^ENDDEF\n?")
            }
            Schema::Modern => {
                // Same escaping the emitter applied to the entry's name.
                let name = regex::escape(&modern::quoted(name));
                format!(r"(?ms)^\(symbol {name} .*?^\)\n?")
            }
        };
        Regex::new(&pattern).map_err(|e| Error::ParseError(e.to_string()))
    }

    fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(&self.path)?)
    }
}

impl LibraryStore for SymbolLibrary {
    fn exists(&self, name: &str) -> Result<bool> {
        let content = self.read()?;
        Ok(self.entry_pattern(name)?.is_match(&content))
    }

    fn write(&self, name: &str, content: &str, overwrite: bool) -> Result<()> {
        let mut library = self.read()?;
        if library.trim().is_empty() {
            library = format!("{}{}", self.header(), self.footer());
        }

        let re = self.entry_pattern(name)?;
        let updated = if let Some(found) = re.find(&library) {
            if !overwrite {
                return Err(Error::AlreadyExists(format!(
                    "symbol '{}' in {}",
                    name,
                    self.path.display()
                )));
            }
            info!("Updating symbol '{}' in {}", name, self.path.display());
            format!("{}{}{}", &library[..found.start()], content, &library[found.end()..])
        } else {
            let at = library.rfind(self.footer()).ok_or_else(|| {
                Error::ParseError(format!("{} has no library footer", self.path.display()))
            })?;
            info!("Adding symbol '{}' to {}", name, self.path.display());
            format!("{}{}{}", &library[..at], content, &library[at..])
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, updated)?;
        Ok(())
    }
}

/// A `.pretty` directory with one file per footprint, next to its
/// `.3dshapes` directory.
pub struct FootprintLibrary {
    pub dir: PathBuf,
    pub shapes_dir: PathBuf,
    pub schema: Schema,
}

impl FootprintLibrary {
    pub fn new(dir: &Path, library: &str, schema: Schema) -> Self {
        FootprintLibrary {
            dir: dir.join(format!("{}.pretty", library)),
            shapes_dir: dir.join(format!("{}.3dshapes", library)),
            schema,
        }
    }

    /// Creates the footprint and 3D model directories.
    pub fn setup_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::create_dir_all(&self.shapes_dir)?;
        Ok(())
    }

    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name, self.schema.footprint_extension()))
    }
}

impl LibraryStore for FootprintLibrary {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.entry_path(name).exists())
    }

    fn write(&self, name: &str, content: &str, overwrite: bool) -> Result<()> {
        let path = self.entry_path(name);
        if path.exists() && !overwrite {
            return Err(Error::AlreadyExists(format!("footprint '{}'", path.display())));
        }
        self.setup_directories()?;
        fs::write(&path, content)?;
        info!("Wrote footprint {}", path.display());
        Ok(())
    }
}
