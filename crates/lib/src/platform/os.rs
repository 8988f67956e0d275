/// Operating systems with a known shared-library naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Extension (without the dot) given to shared libraries on this OS
  pub fn shared_lib_ext(&self) -> &'static str {
    match self {
      Self::Linux => "so",
      Self::MacOs => "dylib",
      Self::Windows => "dll",
    }
  }
}
