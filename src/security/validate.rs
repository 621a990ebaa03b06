use std::fmt;
use thiserror::Error;

/// Which validator a raw caller string is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    FilesystemPath,
    RegistryPath,
    Username,
    Password,
    SearchPattern,
    FreeformScript,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgumentKind::FilesystemPath => "path",
            ArgumentKind::RegistryPath => "registry path",
            ArgumentKind::Username => "username",
            ArgumentKind::Password => "password",
            ArgumentKind::SearchPattern => "search pattern",
            ArgumentKind::FreeformScript => "script",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("must not be empty")]
    Empty,
    #[error("parent-directory traversal is not allowed")]
    Traversal,
    #[error("protected system directory {0} is off limits")]
    ProtectedRoot(&'static str),
    #[error("backslash separators are not accepted, use forward slashes")]
    ForeignSeparator,
    #[error("paths rooted in the local filesystem are not accepted")]
    CallerRooted,
    #[error("only HKCU, HKLM, HKCR, HKU and HKCC hives are allowed")]
    UnknownHive,
    #[error("length must be between {min} and {max} characters (got {actual})")]
    Length { min: usize, max: usize, actual: usize },
    #[error("character {0:?} is not allowed")]
    IllegalCharacter(char),
    #[error("reserved account names cannot be used")]
    ReservedName,
}

/// `Ok(())` is a valid argument; `Err` carries the rejection reason.
pub type ValidationResult = Result<(), ValidationError>;

const PROTECTED_ROOTS: &[&str] = &["c:/windows/system32", "c:/windows/syswow64"];

const REGISTRY_HIVES: &[&str] = &[
    "HKCU:",
    "HKLM:",
    "HKCR:",
    "HKU:",
    "HKCC:",
    "HKEY_CURRENT_USER:",
    "HKEY_LOCAL_MACHINE:",
    "HKEY_CLASSES_ROOT:",
    "HKEY_USERS:",
    "HKEY_CURRENT_CONFIG:",
];

const RESERVED_USERNAMES: &[&str] = &["administrator", "admin", "root", "guest"];

const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 4;
const PASSWORD_MAX: usize = 100;

pub fn validate(raw: &str, kind: ArgumentKind) -> ValidationResult {
    match kind {
        ArgumentKind::FilesystemPath => filesystem_path(raw),
        ArgumentKind::RegistryPath => registry_path(raw),
        ArgumentKind::Username => username(raw),
        ArgumentKind::Password => password(raw),
        ArgumentKind::SearchPattern => search_pattern(raw),
        ArgumentKind::FreeformScript => freeform_script(raw),
    }
}

fn filesystem_path(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }
    // substring match rejects names like `a..b` too
    if raw.contains("..") {
        return Err(ValidationError::Traversal);
    }
    let folded = raw.to_ascii_lowercase().replace('\\', "/");
    if let Some(root) = PROTECTED_ROOTS.iter().find(|r| folded.starts_with(**r)) {
        return Err(ValidationError::ProtectedRoot(*root));
    }
    if raw.contains('\\') {
        return Err(ValidationError::ForeignSeparator);
    }
    if raw.starts_with('/') {
        return Err(ValidationError::CallerRooted);
    }
    Ok(())
}

fn registry_path(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }
    let normalized = raw.to_ascii_uppercase().replace('/', "\\");
    if REGISTRY_HIVES.iter().any(|hive| normalized.starts_with(hive)) {
        Ok(())
    } else {
        Err(ValidationError::UnknownHive)
    }
}

fn username(raw: &str) -> ValidationResult {
    let len = raw.chars().count();
    if !(1..=USERNAME_MAX).contains(&len) {
        return Err(ValidationError::Length { min: 1, max: USERNAME_MAX, actual: len });
    }
    if let Some(c) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
        return Err(ValidationError::IllegalCharacter(c));
    }
    if RESERVED_USERNAMES.iter().any(|r| r.eq_ignore_ascii_case(raw)) {
        return Err(ValidationError::ReservedName);
    }
    Ok(())
}

fn password(raw: &str) -> ValidationResult {
    let len = raw.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(ValidationError::Length { min: PASSWORD_MIN, max: PASSWORD_MAX, actual: len });
    }
    Ok(())
}

fn search_pattern(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return Err(ValidationError::Empty);
    }
    match raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '*')))
    {
        Some(c) => Err(ValidationError::IllegalCharacter(c)),
        None => Ok(()),
    }
}

fn freeform_script(raw: &str) -> ValidationResult {
    if raw.trim().is_empty() {
        Err(ValidationError::Empty)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn filesystem_path_rules() {
        assert_eq!(validate("", ArgumentKind::FilesystemPath), Err(ValidationError::Empty));
        assert_eq!(validate("../../etc", ArgumentKind::FilesystemPath), Err(ValidationError::Traversal));
        assert_eq!(
            validate("C:/Windows/System32/drivers", ArgumentKind::FilesystemPath),
            Err(ValidationError::ProtectedRoot("c:/windows/system32"))
        );
        assert_eq!(
            validate("c:\\windows\\syswow64", ArgumentKind::FilesystemPath),
            Err(ValidationError::ProtectedRoot("c:/windows/syswow64"))
        );
        assert_eq!(
            validate("C:\\Users\\bob", ArgumentKind::FilesystemPath),
            Err(ValidationError::ForeignSeparator)
        );
        assert_eq!(validate("/etc/passwd", ArgumentKind::FilesystemPath), Err(ValidationError::CallerRooted));
        assert!(validate("C:/Users/bob/notes.txt", ArgumentKind::FilesystemPath).is_ok());
        assert!(validate("reports/2024", ArgumentKind::FilesystemPath).is_ok());
    }

    #[test]
    fn registry_hives() {
        assert!(validate("HKCU:\\Software\\Foo", ArgumentKind::RegistryPath).is_ok());
        assert!(validate("hklm:/SOFTWARE/Microsoft", ArgumentKind::RegistryPath).is_ok());
        assert!(validate("HKEY_USERS:\\S-1-5-18", ArgumentKind::RegistryPath).is_ok());
        assert_eq!(validate("HKXX:\\Foo", ArgumentKind::RegistryPath), Err(ValidationError::UnknownHive));
        assert_eq!(validate("Software\\Foo", ArgumentKind::RegistryPath), Err(ValidationError::UnknownHive));
        assert_eq!(validate("", ArgumentKind::RegistryPath), Err(ValidationError::Empty));
    }

    #[test]
    fn usernames() {
        assert!(validate("bob-2", ArgumentKind::Username).is_ok());
        assert_eq!(validate("root", ArgumentKind::Username), Err(ValidationError::ReservedName));
        assert_eq!(validate("Administrator", ArgumentKind::Username), Err(ValidationError::ReservedName));
        assert!(matches!(
            validate(&"a".repeat(21), ArgumentKind::Username),
            Err(ValidationError::Length { actual: 21, .. })
        ));
        assert_eq!(validate("bad name", ArgumentKind::Username), Err(ValidationError::IllegalCharacter(' ')));
        assert!(validate("", ArgumentKind::Username).is_err());
    }

    #[test]
    fn passwords() {
        assert!(validate("abc", ArgumentKind::Password).is_err());
        assert!(validate("abcd", ArgumentKind::Password).is_ok());
        assert!(validate("p@$$ \"w`rd\"", ArgumentKind::Password).is_ok());
        assert!(validate(&"x".repeat(100), ArgumentKind::Password).is_ok());
        assert!(validate(&"x".repeat(101), ArgumentKind::Password).is_err());
    }

    #[test]
    fn search_patterns() {
        assert!(validate("*.log", ArgumentKind::SearchPattern).is_ok());
        assert!(validate("chrome", ArgumentKind::SearchPattern).is_ok());
        assert_eq!(validate("a$b", ArgumentKind::SearchPattern), Err(ValidationError::IllegalCharacter('$')));
        assert_eq!(validate("a b", ArgumentKind::SearchPattern), Err(ValidationError::IllegalCharacter(' ')));
        assert_eq!(validate("", ArgumentKind::SearchPattern), Err(ValidationError::Empty));
    }

    #[test]
    fn freeform_scripts() {
        assert!(validate("Get-Date", ArgumentKind::FreeformScript).is_ok());
        assert_eq!(validate("   ", ArgumentKind::FreeformScript), Err(ValidationError::Empty));
    }

    proptest! {
        #[test]
        fn traversal_always_rejected(prefix in "[a-zA-Z0-9/:_ .-]{0,20}", suffix in "[a-zA-Z0-9/:_ .-]{0,20}") {
            let raw = format!("{prefix}../{suffix}");
            prop_assert!(validate(&raw, ArgumentKind::FilesystemPath).is_err());
        }

        #[test]
        fn registry_valid_iff_known_hive(hive in "[A-Za-z_]{2,20}", rest in "[A-Za-z0-9/\\\\]{0,20}") {
            let raw = format!("{hive}:{rest}");
            let upper = format!("{}:", hive.to_ascii_uppercase());
            let known = REGISTRY_HIVES.iter().any(|h| *h == upper);
            prop_assert_eq!(validate(&raw, ArgumentKind::RegistryPath).is_ok(), known);
        }

        #[test]
        fn username_matches_shape(name in "[A-Za-z0-9_ -]{0,24}") {
            let shape = !name.is_empty()
                && name.len() <= 20
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            let reserved = RESERVED_USERNAMES.iter().any(|r| r.eq_ignore_ascii_case(&name));
            prop_assert_eq!(validate(&name, ArgumentKind::Username).is_ok(), shape && !reserved);
        }
    }
}
