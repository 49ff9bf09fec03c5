//! Declaration file loading.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::declare::declare;
use super::registry::{InterfaceRegistry, TypeRegistry};
use super::schema::DeclarationFile;
use crate::error::{ConformityError, Result};
use crate::interface::InterfaceRef;

/// Load a single declaration file.
///
/// # Errors
///
/// Returns `DeclarationsNotFound` if the file doesn't exist and
/// `DeclarationsParseError` if it is not a valid declaration document.
pub fn load_declarations_file(path: &Path) -> Result<DeclarationFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConformityError::DeclarationsNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConformityError::Io(e)
        }
    })?;

    parse_declarations(&content, path)
}

/// Parse YAML content into a [`DeclarationFile`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_declarations(content: &str, source_path: &Path) -> Result<DeclarationFile> {
    serde_yaml::from_str(content).map_err(|e| ConformityError::DeclarationsParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a declaration file and declare every interface in it.
///
/// Declared interfaces are added to `interfaces` and returned in file order.
pub fn load_interfaces(
    path: &Path,
    types: &TypeRegistry,
    interfaces: &mut InterfaceRegistry,
) -> Result<Vec<InterfaceRef>> {
    let file = load_declarations_file(path)?;
    debug!(path = %path.display(), interfaces = file.interfaces.len(), "declarations loaded");
    declare(&file, types, interfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("interfaces.yml");
        fs::write(&path, "interfaces:\n  IEmpty: {}\n").unwrap();

        let file = load_declarations_file(&path).unwrap();
        assert!(file.interfaces.contains_key("IEmpty"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");

        let err = load_declarations_file(&path).unwrap_err();
        assert!(matches!(err, ConformityError::DeclarationsNotFound { path: ref p } if *p == path));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.yml");
        fs::write(&path, "interfaces: [unclosed").unwrap();

        let err = load_declarations_file(&path).unwrap_err();
        match err {
            ConformityError::DeclarationsParseError { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_reports_source_path() {
        let err = parse_declarations("policy: lenient", Path::new("inline.yml")).unwrap_err();
        assert!(err.to_string().contains("inline.yml"));
    }

    #[test]
    fn load_interfaces_registers_everything() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("interfaces.yml");
        fs::write(
            &path,
            r#"
interfaces:
  ISized:
    members:
      __len__: { kind: method, args: 0 }
  IContainer:
    extends: [ISized]
    members:
      __contains__: { kind: method, args: 1 }
"#,
        )
        .unwrap();

        let mut registry = InterfaceRegistry::new();
        let declared =
            load_interfaces(&path, &TypeRegistry::with_builtins(), &mut registry).unwrap();

        assert_eq!(declared.len(), 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("IContainer").unwrap().requirements().len(), 2);
    }
}
