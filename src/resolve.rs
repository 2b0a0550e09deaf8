//! Font resolution.
//!
//! The [`FontResolver`][] selects the single type-face that is used to draw a report.  It tries
//! these sources in order and stops at the first success:
//!
//! 1. the explicit path from the [`FontConfig`][],
//! 2. the bundled project fonts,
//! 3. well-known font locations of the host [`Platform`][],
//! 4. the built-in Japanese font [`Builtin::HeiseiKakuGo`][],
//! 5. the built-in Latin font [`Builtin::Helvetica`][].
//!
//! The last tier cannot fail, so resolution always produces a usable [`ResolvedFont`][].  Every
//! degraded tier is reported with `log::warn!`.
//!
//! All filesystem access goes through a [`FontEnvironment`][].  [`HostEnvironment`][] reads the
//! real filesystem, [`EmptyEnvironment`][] simulates a machine without any fonts.
//!
//! [`FontResolver`]: struct.FontResolver.html
//! [`FontConfig`]: struct.FontConfig.html
//! [`Platform`]: enum.Platform.html
//! [`ResolvedFont`]: struct.ResolvedFont.html
//! [`FontEnvironment`]: trait.FontEnvironment.html
//! [`HostEnvironment`]: struct.HostEnvironment.html
//! [`EmptyEnvironment`]: struct.EmptyEnvironment.html
//! [`Builtin::HeiseiKakuGo`]: ../fonts/enum.Builtin.html#variant.HeiseiKakuGo
//! [`Builtin::Helvetica`]: ../fonts/enum.Builtin.html#variant.Helvetica

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fonts::{self, Builtin, FontData};
use crate::subsetting::{self, EmbeddedSubset};

/// The characters that a font found on the system must cover to be accepted.
pub const DEFAULT_PROBE_TEXT: &str = "事故状況対策報告書あア";

/// The name of the font file that is bundled with the project.
const BUNDLED_FONT_FILE: &str = "IPAexGothic.ttf";

/// Access to the fonts of the machine that renders a report.
pub trait FontEnvironment {
    /// Reads the file at the given path.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Returns the files matching the given glob pattern, in a stable order.
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;

    /// Returns whether the built-in composite Japanese font may be used.
    fn supports_builtin_cid_fonts(&self) -> bool;
}

/// The font environment of the host system.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostEnvironment;

impl FontEnvironment for HostEnvironment {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        match glob::glob(pattern) {
            Ok(paths) => paths.flatten().filter(|path| path.is_file()).collect(),
            Err(err) => {
                log::debug!("Ignoring invalid font pattern {}: {}", pattern, err);
                Vec::new()
            }
        }
    }

    fn supports_builtin_cid_fonts(&self) -> bool {
        true
    }
}

/// A font environment without any font files and without built-in composite fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyEnvironment;

impl FontEnvironment for EmptyEnvironment {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
    }

    fn glob(&self, _pattern: &str) -> Vec<PathBuf> {
        Vec::new()
    }

    fn supports_builtin_cid_fonts(&self) -> bool {
        false
    }
}

/// An operating system family with its own font locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Linux and other Unix-like systems using the freedesktop font directories.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
}

impl Platform {
    /// Returns the platform this crate was compiled for.
    pub fn current() -> Platform {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Returns the font search patterns of this platform in order of preference.
    pub fn search_patterns(&self) -> &'static [SearchPattern] {
        match self {
            Platform::Linux => LINUX_PATTERNS,
            Platform::MacOs => MACOS_PATTERNS,
            Platform::Windows => WINDOWS_PATTERNS,
        }
    }
}

/// A glob pattern for font files on a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchPattern {
    /// The glob pattern.
    pub pattern: &'static str,
    /// Whether the matched fonts are known to cover Japanese text.
    pub covers_script: bool,
    /// Whether the pattern matches font collections (`.ttc`).
    pub collection: bool,
}

const fn full(pattern: &'static str) -> SearchPattern {
    SearchPattern {
        pattern,
        covers_script: true,
        collection: false,
    }
}

const fn latin(pattern: &'static str) -> SearchPattern {
    SearchPattern {
        pattern,
        covers_script: false,
        collection: false,
    }
}

const fn collection(pattern: &'static str) -> SearchPattern {
    SearchPattern {
        pattern,
        covers_script: true,
        collection: true,
    }
}

const LINUX_PATTERNS: &[SearchPattern] = &[
    full("/usr/share/fonts/opentype/ipaexfont-gothic/ipaexg.ttf"),
    full("/usr/share/fonts/truetype/fonts-japanese-gothic.ttf"),
    full("/usr/share/fonts/**/ipaexg.ttf"),
    full("/usr/share/fonts/**/ipag.ttf"),
    full("/usr/share/fonts/**/*Gothic*.ttf"),
    full("/usr/share/fonts/**/NotoSansJP-*.ttf"),
    full("/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf"),
    full("/usr/local/share/fonts/**/*.ttf"),
    latin("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    latin("/usr/share/fonts/**/*.ttf"),
    collection("/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc"),
    collection("/usr/share/fonts/**/*CJK*.ttc"),
];

const MACOS_PATTERNS: &[SearchPattern] = &[
    full("/Library/Fonts/IPAexGothic.ttf"),
    full("/Library/Fonts/Arial Unicode.ttf"),
    full("/System/Library/Fonts/Supplemental/Arial Unicode.ttf"),
    full("/Library/Fonts/*Gothic*.ttf"),
    latin("/System/Library/Fonts/Supplemental/Arial.ttf"),
    latin("/Library/Fonts/*.ttf"),
    collection("/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc"),
    collection("/System/Library/Fonts/Hiragino Sans GB.ttc"),
];

const WINDOWS_PATTERNS: &[SearchPattern] = &[
    full("C:\\Windows\\Fonts\\ipaexg.ttf"),
    full("C:\\Windows\\Fonts\\ipag.ttf"),
    latin("C:\\Windows\\Fonts\\arial.ttf"),
    collection("C:\\Windows\\Fonts\\BIZ-UDGothicR.ttc"),
    collection("C:\\Windows\\Fonts\\meiryo.ttc"),
    collection("C:\\Windows\\Fonts\\msgothic.ttc"),
    collection("C:\\Windows\\Fonts\\YuGothR.ttc"),
];

/// Configures the [`FontResolver`](struct.FontResolver.html).
#[derive(Clone, Debug)]
pub struct FontConfig {
    explicit_path: Option<PathBuf>,
    bundled_paths: Vec<PathBuf>,
    platform: Platform,
    probe_text: String,
    builtin_cid_fonts: bool,
}

impl Default for FontConfig {
    fn default() -> FontConfig {
        FontConfig {
            explicit_path: None,
            bundled_paths: vec![
                Path::new(env!("CARGO_MANIFEST_DIR"))
                    .join("fonts")
                    .join(BUNDLED_FONT_FILE),
                Path::new("fonts").join(BUNDLED_FONT_FILE),
                Path::new("fonts").join("ipaexg.ttf"),
            ],
            platform: Platform::current(),
            probe_text: DEFAULT_PROBE_TEXT.to_owned(),
            builtin_cid_fonts: true,
        }
    }
}

impl FontConfig {
    /// Sets the font file that is tried first.
    pub fn with_explicit_path(mut self, path: impl Into<PathBuf>) -> FontConfig {
        self.explicit_path = Some(path.into());
        self
    }

    /// Replaces the bundled font candidates.
    pub fn with_bundled_paths(mut self, paths: Vec<PathBuf>) -> FontConfig {
        self.bundled_paths = paths;
        self
    }

    /// Sets the platform whose font locations are searched.
    pub fn with_platform(mut self, platform: Platform) -> FontConfig {
        self.platform = platform;
        self
    }

    /// Sets the text that a system font must cover to be accepted.
    pub fn with_probe_text(mut self, probe_text: impl Into<String>) -> FontConfig {
        self.probe_text = probe_text.into();
        self
    }

    /// Enables or disables the built-in composite Japanese font.
    pub fn with_builtin_cid_fonts(mut self, enabled: bool) -> FontConfig {
        self.builtin_cid_fonts = enabled;
        self
    }

    /// Returns the explicit font path, if set.
    pub fn explicit_path(&self) -> Option<&Path> {
        self.explicit_path.as_deref()
    }

    /// Returns the bundled candidates, including the project-relative variant of the explicit
    /// path.
    fn bundled_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = self.bundled_paths.clone();
        if let Some(file_name) = self.explicit_path.as_ref().and_then(|path| path.file_name()) {
            let relative = Path::new("fonts").join(file_name);
            if !candidates.contains(&relative) {
                candidates.insert(0, relative);
            }
        }
        candidates
    }
}

/// The tier of the resolution chain that produced a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolutionTier {
    /// The explicitly requested font file.
    Explicit,
    /// A font file bundled with the project.
    Bundled,
    /// A font file found in the system font directories.
    System,
    /// The built-in composite Japanese font.
    BuiltinCjk,
    /// The built-in Latin font.  Japanese text is not drawn correctly.
    LatinOnly,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionTier::Explicit => "explicit font",
            ResolutionTier::Bundled => "bundled font",
            ResolutionTier::System => "system font",
            ResolutionTier::BuiltinCjk => "built-in CJK font",
            ResolutionTier::LatinOnly => "built-in Latin font",
        };
        f.write_str(name)
    }
}

/// The result of font resolution: an immutable handle to the selected type-face.
///
/// The handle replaces any process-wide font registration.  It is passed explicitly to the
/// measuring, layout and rendering code and can be shared between threads.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    data: FontData,
    tier: ResolutionTier,
    path: Option<PathBuf>,
}

impl ResolvedFont {
    /// Creates a handle for the given font data.
    pub fn new(data: FontData, tier: ResolutionTier, path: Option<PathBuf>) -> ResolvedFont {
        ResolvedFont { data, tier, path }
    }

    /// Creates a handle for a built-in font.
    pub fn builtin(builtin: Builtin) -> ResolvedFont {
        let tier = if builtin.is_latin_only() {
            ResolutionTier::LatinOnly
        } else {
            ResolutionTier::BuiltinCjk
        };
        ResolvedFont::new(FontData::builtin(builtin), tier, None)
    }

    /// Returns the font data.
    pub fn data(&self) -> &FontData {
        &self.data
    }

    /// Returns the tier that produced this font.
    pub fn tier(&self) -> ResolutionTier {
        self.tier
    }

    /// Returns the file the font was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns a name for the font that can be used in the PDF file.
    pub fn name(&self) -> String {
        if let Some(builtin) = self.data.builtin_font() {
            return builtin.base_font().to_owned();
        }
        let stem = self
            .path
            .as_ref()
            .and_then(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name: String = stem
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        if name.is_empty() {
            "ReportFont".to_owned()
        } else {
            name
        }
    }
}

impl std::ops::Deref for ResolvedFont {
    type Target = FontData;

    fn deref(&self) -> &FontData {
        &self.data
    }
}

/// Selects the type-face for a report, see the [module documentation](index.html).
#[derive(Clone, Debug, Default)]
pub struct FontResolver {
    config: FontConfig,
}

impl FontResolver {
    /// Creates a resolver with the given configuration.
    pub fn new(config: FontConfig) -> FontResolver {
        FontResolver { config }
    }

    /// Returns the configuration of this resolver.
    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    /// Resolves the font in the given environment.  This method never fails.
    pub fn resolve(&self, env: &dyn FontEnvironment) -> ResolvedFont {
        let resolved = self
            .resolve_explicit(env)
            .or_else(|| self.resolve_bundled(env))
            .or_else(|| self.resolve_system(env))
            .or_else(|| self.resolve_builtin_cjk(env))
            .unwrap_or_else(|| {
                log::warn!(
                    "No Japanese font available, falling back to {}; Japanese text will not be \
                     rendered correctly",
                    Builtin::Helvetica.base_font()
                );
                ResolvedFont::builtin(Builtin::Helvetica)
            });
        log::info!("Using {} {}", resolved.tier(), resolved.name());
        resolved
    }

    fn resolve_explicit(&self, env: &dyn FontEnvironment) -> Option<ResolvedFont> {
        let path = self.config.explicit_path.as_ref()?;
        let font =
            load(env, path, ResolutionTier::Explicit).and_then(|font| self.embeddable(font));
        if font.is_none() {
            log::warn!("Font {} is not usable, trying fallbacks", path.display());
        }
        font
    }

    fn resolve_bundled(&self, env: &dyn FontEnvironment) -> Option<ResolvedFont> {
        self.config
            .bundled_candidates()
            .iter()
            .find_map(|path| {
                load(env, path, ResolutionTier::Bundled).and_then(|font| self.embeddable(font))
            })
    }

    fn resolve_system(&self, env: &dyn FontEnvironment) -> Option<ResolvedFont> {
        let mut patterns: Vec<&SearchPattern> =
            self.config.platform.search_patterns().iter().collect();
        // stable sort keeps the platform order within each group
        patterns.sort_by_key(|pattern| (pattern.collection, !pattern.covers_script));
        let needs_script = self
            .config
            .probe_text
            .chars()
            .any(|c| !c.is_whitespace() && fonts::winansi_byte(c).is_none());

        let mut visited = HashSet::new();
        for pattern in patterns {
            if needs_script && !pattern.covers_script {
                log::debug!("Skipping Latin font pattern {}", pattern.pattern);
                continue;
            }
            for path in env.glob(pattern.pattern) {
                if !visited.insert(path.clone()) {
                    continue;
                }
                let font = match load(env, &path, ResolutionTier::System) {
                    Some(font) => font,
                    None => continue,
                };
                let coverage = font.check_coverage(&self.config.probe_text);
                if coverage.is_complete() {
                    match self.embeddable(font) {
                        Some(font) => return Some(font),
                        None => continue,
                    }
                }
                log::debug!(
                    "Skipping {} ({:.0}% coverage): missing glyphs for {:?}",
                    path.display(),
                    coverage.coverage_percent(),
                    coverage.missing_chars()
                );
            }
        }
        None
    }

    fn resolve_builtin_cjk(&self, env: &dyn FontEnvironment) -> Option<ResolvedFont> {
        if self.config.builtin_cid_fonts && env.supports_builtin_cid_fonts() {
            log::warn!(
                "No Japanese font file found, using the non-embedded {}",
                Builtin::HeiseiKakuGo.base_font()
            );
            Some(ResolvedFont::builtin(Builtin::HeiseiKakuGo))
        } else {
            None
        }
    }

    /// Returns the font if it can be prepared for embedding, so that rendering cannot fail on
    /// a font that resolution accepted.
    fn embeddable(&self, font: ResolvedFont) -> Option<ResolvedFont> {
        let probe_chars = subsetting::collect_used_chars(Some(self.config.probe_text.as_str()));
        match EmbeddedSubset::new(&font, &probe_chars) {
            Ok(_) => Some(font),
            Err(err) => {
                log::debug!("Cannot embed font {}: {}", font.name(), err);
                None
            }
        }
    }
}

fn load(env: &dyn FontEnvironment, path: &Path, tier: ResolutionTier) -> Option<ResolvedFont> {
    let data = match env.read(path) {
        Ok(data) => data,
        Err(err) => {
            log::debug!("Cannot read font {}: {}", path.display(), err);
            return None;
        }
    };
    match FontData::new(data) {
        Ok(font) => Some(ResolvedFont::new(font, tier, Some(path.to_owned()))),
        Err(err) => {
            log::debug!("Cannot load font {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::tests::sfnt_header;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// A fake environment with a fixed set of files that records every read.
    #[derive(Default)]
    struct FakeEnvironment {
        files: HashMap<PathBuf, Vec<u8>>,
        globs: HashMap<&'static str, Vec<PathBuf>>,
        cid: bool,
        reads: RefCell<Vec<PathBuf>>,
    }

    impl FontEnvironment for FakeEnvironment {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.reads.borrow_mut().push(path.to_owned());
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
        }

        fn glob(&self, pattern: &str) -> Vec<PathBuf> {
            self.globs.get(pattern).cloned().unwrap_or_default()
        }

        fn supports_builtin_cid_fonts(&self) -> bool {
            self.cid
        }
    }

    #[test]
    fn test_empty_environment_falls_back_to_latin() {
        let config = FontConfig::default().with_explicit_path("does/not/exist.ttf");
        let font = FontResolver::new(config).resolve(&EmptyEnvironment);
        assert_eq!(font.tier(), ResolutionTier::LatinOnly);
        assert_eq!(font.data().builtin_font(), Some(Builtin::Helvetica));
        assert_eq!(font.name(), "Helvetica");
        assert!(font.path().is_none());
    }

    #[test]
    fn test_builtin_cjk_before_latin() {
        let env = FakeEnvironment {
            cid: true,
            ..FakeEnvironment::default()
        };
        let font = FontResolver::default().resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::BuiltinCjk);
        assert_eq!(font.name(), "HeiseiKakuGo-W5");
    }

    #[test]
    fn test_disabled_builtin_cjk() {
        let env = FakeEnvironment {
            cid: true,
            ..FakeEnvironment::default()
        };
        let config = FontConfig::default().with_builtin_cid_fonts(false);
        let font = FontResolver::new(config).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::LatinOnly);
    }

    #[test]
    fn test_unparseable_files_are_skipped() {
        let mut env = FakeEnvironment::default();
        env.files.insert(PathBuf::from("custom.ttf"), vec![1, 2, 3]);
        env.files
            .insert(Path::new("fonts").join("custom.ttf"), b"not a font".to_vec());
        env.globs.insert(
            "/usr/share/fonts/**/ipaexg.ttf",
            vec![PathBuf::from("/usr/share/fonts/broken/ipaexg.ttf")],
        );
        let config = FontConfig::default()
            .with_explicit_path("custom.ttf")
            .with_platform(Platform::Linux);
        let font = FontResolver::new(config).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::LatinOnly);
    }

    #[test]
    fn test_cff_fonts_fall_through() {
        let otf = sfnt_header(b"OTTO", &[b"CFF ", b"cmap", b"head"]);
        let mut ttc = b"ttcf".to_vec();
        ttc.extend_from_slice(&[0, 1, 0, 0]);
        ttc.extend_from_slice(&1u32.to_be_bytes());
        ttc.extend_from_slice(&16u32.to_be_bytes());
        ttc.extend_from_slice(&otf);

        let system_path = PathBuf::from("/usr/share/fonts/truetype/fonts-japanese-gothic.ttf");
        let mut env = FakeEnvironment {
            cid: true,
            ..FakeEnvironment::default()
        };
        env.files.insert(PathBuf::from("NotoSansJP-Regular.otf"), otf);
        env.files.insert(system_path.clone(), ttc);
        env.globs.insert(
            "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
            vec![system_path.clone()],
        );

        let config = FontConfig::default()
            .with_explicit_path("NotoSansJP-Regular.otf")
            .with_bundled_paths(Vec::new())
            .with_platform(Platform::Linux);
        let font = FontResolver::new(config).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::BuiltinCjk);

        let reads = env.reads.borrow();
        assert!(reads.contains(&PathBuf::from("NotoSansJP-Regular.otf")));
        assert!(reads.contains(&system_path));
    }

    #[test]
    fn test_system_scan_reads_each_file_once() {
        let broken = PathBuf::from("/usr/share/fonts/broken/ipaexg.ttf");
        let latin_file = PathBuf::from("/usr/share/fonts/truetype/latin/Sans.ttf");
        let mut env = FakeEnvironment::default();
        env.files.insert(broken.clone(), b"not a font".to_vec());
        env.globs.insert("/usr/share/fonts/**/ipaexg.ttf", vec![broken.clone()]);
        env.globs.insert("/usr/share/fonts/**/*Gothic*.ttf", vec![broken.clone()]);
        env.globs.insert("/usr/share/fonts/**/*.ttf", vec![broken.clone(), latin_file.clone()]);
        let config = FontConfig::default()
            .with_bundled_paths(Vec::new())
            .with_platform(Platform::Linux);

        // Latin fonts cannot cover the default probe text, so their patterns are skipped
        let font = FontResolver::new(config.clone()).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::LatinOnly);
        assert_eq!(*env.reads.borrow(), vec![broken.clone()]);

        env.reads.borrow_mut().clear();
        let font = FontResolver::new(config.with_probe_text("Report")).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::LatinOnly);
        assert_eq!(*env.reads.borrow(), vec![broken, latin_file]);
    }

    #[test]
    fn test_bundled_candidates_include_explicit_file_name() {
        let config = FontConfig::default()
            .with_bundled_paths(vec![PathBuf::from("a.ttf")])
            .with_explicit_path("/opt/fonts/custom.ttf");
        assert_eq!(
            config.bundled_candidates(),
            vec![Path::new("fonts").join("custom.ttf"), PathBuf::from("a.ttf")]
        );
    }

    #[test]
    fn test_search_patterns_prefer_single_files() {
        for platform in [Platform::Linux, Platform::MacOs, Platform::Windows].iter() {
            let patterns = platform.search_patterns();
            assert!(patterns[0].covers_script);
            assert!(!patterns[0].collection);
            let first_collection = patterns.iter().position(|p| p.collection).unwrap();
            assert!(patterns[first_collection..].iter().all(|p| p.collection));
        }
    }

    #[test]
    fn test_system_font_needs_probe_coverage() {
        let data = match std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf") {
            Ok(data) => data,
            Err(_) => return,
        };
        let path = PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        let mut env = FakeEnvironment::default();
        env.files.insert(path.clone(), data);
        env.globs
            .insert("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", vec![path.clone()]);
        let linux = FontConfig::default()
            .with_platform(Platform::Linux)
            .with_bundled_paths(Vec::new());

        // DejaVu Sans has no kanji
        let font = FontResolver::new(linux.clone()).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::LatinOnly);

        let font = FontResolver::new(linux.with_probe_text("Report")).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::System);
        assert_eq!(font.path(), Some(path.as_path()));
        assert_eq!(font.name(), "DejaVuSans");
    }

    #[test]
    fn test_explicit_font_wins() {
        let data = match std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf") {
            Ok(data) => data,
            Err(_) => return,
        };
        let mut env = FakeEnvironment::default();
        env.files.insert(PathBuf::from("my font.ttf"), data);
        let config = FontConfig::default().with_explicit_path("my font.ttf");
        let font = FontResolver::new(config).resolve(&env);
        assert_eq!(font.tier(), ResolutionTier::Explicit);
        assert_eq!(font.name(), "myfont");
    }
}
