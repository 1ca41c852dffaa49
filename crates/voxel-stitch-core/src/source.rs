use crate::error::{Result, StitchError};
use crate::pixels::TexturePixels;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolves a texture name to decoded pixels.
///
/// Fetches for different names may run concurrently and complete in any order.
#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    async fn fetch_image(&self, name: &str) -> Result<TexturePixels>;
}

/// Fixed name -> pixels table.
#[derive(Debug, Default, Clone)]
pub struct MemoryImageSource {
    textures: HashMap<String, TexturePixels>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture(mut self, name: impl Into<String>, pixels: TexturePixels) -> Self {
        self.insert(name, pixels);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, pixels: TexturePixels) {
        self.textures.insert(name.into(), pixels);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn fetch_image(&self, name: &str) -> Result<TexturePixels> {
        self.textures
            .get(name)
            .cloned()
            .ok_or_else(|| StitchError::TextureNotFound(name.to_string()))
    }
}

/// Namespace used when a texture name carries none.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Path of a block texture inside a resource pack.
///
/// `"dirt"` maps to `assets/minecraft/textures/blocks/dirt.png`,
/// `"mymod:ore"` to `assets/mymod/textures/blocks/ore.png`.
pub fn texture_path(name: &str) -> String {
    let (namespace, path) = name.split_once(':').unwrap_or((DEFAULT_NAMESPACE, name));
    format!("assets/{namespace}/textures/blocks/{path}.png")
}

/// Whether `name` stays inside a pack once mapped by [`texture_path`].
///
/// Rejects empty or `.`/`..` segments, a leading `/`, backslashes and a namespace that
/// contains `/`.
pub fn is_valid_texture_name(name: &str) -> bool {
    let (namespace, path) = name.split_once(':').unwrap_or((DEFAULT_NAMESPACE, name));
    if name.contains('\\') || namespace.contains('/') || path.contains(':') {
        return false;
    }
    std::iter::once(namespace)
        .chain(path.split('/'))
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Inverse of [`texture_path`] for pack-relative paths (always `/`-separated).
pub fn texture_name(rel_path: &str) -> Option<String> {
    let rest = rel_path.strip_prefix("assets/")?;
    let (namespace, rest) = rest.split_once('/')?;
    let stem = rest.strip_prefix("textures/blocks/")?.strip_suffix(".png")?;
    if stem.is_empty() {
        return None;
    }
    if namespace == DEFAULT_NAMESPACE {
        Some(stem.to_string())
    } else {
        Some(format!("{namespace}:{stem}"))
    }
}

/// One resource pack location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pack {
    /// Unpacked pack directory.
    Directory(PathBuf),
    /// Zipped pack.
    Zip(PathBuf),
}

impl Pack {
    /// `.zip` files are archives; anything else is treated as a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip {
            Self::Zip(path)
        } else {
            Self::Directory(path)
        }
    }

    /// Encoded bytes of `rel_path`, or `None` when the pack lacks it.
    fn read(&self, rel_path: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Pack::Directory(root) => {
                let full = root.join(rel_path);
                match std::fs::read(&full) {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            Pack::Zip(archive) => {
                let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
                let mut entry = match zip.by_name(rel_path) {
                    Ok(entry) => entry,
                    Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
        }
    }
}

/// Loads block textures from a stack of resource packs; the first pack holding a
/// texture wins. Reads and decodes on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct PackImageSource {
    packs: Vec<Pack>,
}

impl PackImageSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            packs: paths.into_iter().map(Pack::from_path).collect(),
        }
    }

    fn load_blocking(packs: &[Pack], name: &str) -> Result<TexturePixels> {
        if !is_valid_texture_name(name) {
            warn!(name, "texture name escapes the pack layout; skipped");
            return Err(StitchError::TextureNotFound(name.to_string()));
        }
        let rel = texture_path(name);
        for pack in packs {
            if let Some(bytes) = pack.read(&rel)? {
                debug!(name, ?pack, "texture found");
                let img = image::load_from_memory(&bytes).map_err(|e| StitchError::ImageFetch {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
                return Ok(TexturePixels::from_dynamic(img));
            }
        }
        Err(StitchError::TextureNotFound(name.to_string()))
    }
}

#[async_trait]
impl ImageSource for PackImageSource {
    async fn fetch_image(&self, name: &str) -> Result<TexturePixels> {
        let packs = self.packs.clone();
        let owned = name.to_string();
        tokio::task::spawn_blocking(move || Self::load_blocking(&packs, &owned))
            .await
            .map_err(|e| StitchError::ImageFetch {
                name: name.to_string(),
                reason: e.to_string(),
            })?
    }
}

/// True when `path` looks like a directory pack (has an `assets` folder).
pub fn is_directory_pack(path: &Path) -> bool {
    path.join("assets").is_dir()
}
