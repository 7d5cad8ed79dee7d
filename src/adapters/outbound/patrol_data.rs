use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::loader::waypoints_from_geojson;
use crate::domains::patrol::ports::PatrolDataSource;
use crate::domains::patrol::Waypoint;

/// Reads waypoint sources from `<base>/geojson/<name>`.
pub struct FilesystemDataSource {
    base: PathBuf,
}

impl FilesystemDataSource {
    /// Base directory precedence: explicit argument, `PATROL_DATA_DIR`,
    /// `./resources/patrol`, then `/usr/share/patrol-fleet`.
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| {
            if let Ok(v) = env::var("PATROL_DATA_DIR") {
                return PathBuf::from(v);
            }
            let cwd_default = Path::new("resources/patrol");
            if cwd_default.exists() {
                cwd_default.to_path_buf()
            } else {
                PathBuf::from("/usr/share/patrol-fleet")
            }
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn geojson_path(&self, name: &str) -> DomainResult<PathBuf> {
        let file = Path::new(name);
        if file.components().count() != 1 || file.file_name().is_none() {
            return Err(DomainError::invalid(format!("invalid source name '{}'", name)));
        }
        Ok(self.base.join("geojson").join(file))
    }

    /// Store a GeoJSON source, creating the folder on first use.
    pub fn save_geojson(&self, name: &str, contents: &str) -> DomainResult<()> {
        let path = self.geojson_path(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DomainError::InfrastructureError(e.to_string()))?;
        }
        fs::write(&path, contents).map_err(|e| DomainError::InfrastructureError(e.to_string()))
    }

    pub fn load_waypoints(&self, name: &str) -> DomainResult<Vec<Waypoint>> {
        waypoints_from_geojson(&self.load_geojson(name)?)
    }
}

impl PatrolDataSource for FilesystemDataSource {
    fn load_geojson(&self, name: &str) -> DomainResult<String> {
        let path = self.geojson_path(name)?;
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DomainError::not_found(name),
            _ => DomainError::InfrastructureError(format!("{}: {}", path.display(), e)),
        })
    }
}
