// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Domain Invariants
//!
//! Business rules checked while resource definitions are declared. All
//! functions are pure and return detailed validation results; the
//! definitions in `composition` call them before emitting nodes.
//!
//! # Invariant Categories
//!
//! 1. **Naming**: node names and attribute keys
//! 2. **Sizing**: task CPU/memory combinations
//! 3. **Scaling**: capacity bounds, targets, capacity provider weights
//! 4. **Networking**: container ports

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid resource name: {0:?}")]
    InvalidName(String),

    #[error("Invalid attribute key: {0:?}")]
    InvalidAttributeKey(String),

    #[error("Unsupported task size: {cpu} CPU units with {memory_mib} MiB")]
    InvalidTaskSize { cpu: u32, memory_mib: u32 },

    #[error("Invalid capacity bounds: min {min}, max {max}")]
    InvalidCapacity { min: u32, max: u32 },

    #[error("Invalid scaling target: {0}")]
    InvalidTarget(String),

    #[error("At least one capacity provider needs a positive weight")]
    NoCapacityProvider,

    #[error("Invalid container port: {0}")]
    InvalidPort(u16),

    #[error("Business rule violated: {0}")]
    BusinessRule(String),
}

/// Maximum length of a resource node name
pub const MAX_NAME_LENGTH: usize = 128;

/// Validate a resource node name
///
/// # Rules
/// - Non-empty, at most 128 characters
/// - ASCII alphanumerics plus `-`, `_`, `.`, `/`
/// - Must not start or end with `/`
pub fn validate_resource_name(name: &str) -> ValidationResult {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));

    if name.is_empty()
        || name.len() > MAX_NAME_LENGTH
        || !valid_chars
        || name.starts_with('/')
        || name.ends_with('/')
    {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validate an attribute key
///
/// # Rules
/// - snake_case: lowercase ASCII letters, digits and `_`
/// - Starts with a letter
pub fn validate_attribute_key(key: &str) -> ValidationResult {
    let starts_with_letter = key.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let snake_case = key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if !starts_with_letter || !snake_case {
        return Err(ValidationError::InvalidAttributeKey(key.to_string()));
    }
    Ok(())
}

/// Validate a serverless task size
///
/// # Rules
/// Allowed memory per CPU tier (MiB):
/// - 256: 512, 1024, 2048
/// - 512: 1024..=4096 in 1024 steps
/// - 1024: 2048..=8192 in 1024 steps
/// - 2048: 4096..=16384 in 1024 steps
/// - 4096: 8192..=30720 in 1024 steps
pub fn validate_task_size(cpu: u32, memory_mib: u32) -> ValidationResult {
    let valid = match cpu {
        256 => matches!(memory_mib, 512 | 1024 | 2048),
        512 => in_steps(memory_mib, 1024, 4096),
        1024 => in_steps(memory_mib, 2048, 8192),
        2048 => in_steps(memory_mib, 4096, 16384),
        4096 => in_steps(memory_mib, 8192, 30720),
        _ => false,
    };

    if !valid {
        return Err(ValidationError::InvalidTaskSize { cpu, memory_mib });
    }
    Ok(())
}

fn in_steps(value: u32, min: u32, max: u32) -> bool {
    (min..=max).contains(&value) && value % 1024 == 0
}

/// Validate autoscaling capacity bounds
///
/// # Rules
/// - `max` must be positive
/// - `min <= max`
pub fn validate_capacity(min: u32, max: u32) -> ValidationResult {
    if max == 0 || min > max {
        return Err(ValidationError::InvalidCapacity { min, max });
    }
    Ok(())
}

/// Validate that a desired task count sits within capacity bounds
pub fn validate_desired_count(desired: u32, min: u32, max: u32) -> ValidationResult {
    validate_capacity(min, max)?;
    if !(min..=max).contains(&desired) {
        return Err(ValidationError::BusinessRule(format!(
            "desired count {desired} outside capacity {min}..={max}"
        )));
    }
    Ok(())
}

/// Validate a utilization target percentage (1-100)
pub fn validate_utilization_target(percent: u32) -> ValidationResult {
    if percent == 0 || percent > 100 {
        return Err(ValidationError::InvalidTarget(format!(
            "utilization must be 1-100%, got {percent}%"
        )));
    }
    Ok(())
}

/// Validate a requests-per-target value
pub fn validate_request_target(requests: u32) -> ValidationResult {
    if requests == 0 {
        return Err(ValidationError::InvalidTarget(
            "requests per target must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Validate capacity provider weights
///
/// # Rules
/// - At least one provider with a positive weight
pub fn validate_capacity_weights(weights: &[(String, u32)]) -> ValidationResult {
    if !weights.iter().any(|(_, weight)| *weight > 0) {
        return Err(ValidationError::NoCapacityProvider);
    }
    Ok(())
}

/// Validate a container port (0 is reserved)
pub fn validate_port(port: u16) -> ValidationResult {
    if port == 0 {
        return Err(ValidationError::InvalidPort(port));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_resource_name() {
        assert!(validate_resource_name("Networking/Vpc").is_ok());
        assert!(validate_resource_name("BackendApp/Pipeline.Source").is_ok());
        assert!(validate_resource_name("").is_err());
        assert!(validate_resource_name("/leading").is_err());
        assert!(validate_resource_name("trailing/").is_err());
        assert!(validate_resource_name("has space").is_err());
        assert!(validate_resource_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_attribute_key() {
        assert!(validate_attribute_key("cidr").is_ok());
        assert!(validate_attribute_key("memory_limit_mib").is_ok());
        assert!(validate_attribute_key("").is_err());
        assert!(validate_attribute_key("9lives").is_err());
        assert!(validate_attribute_key("camelCase").is_err());
    }

    #[test]
    fn test_validate_task_size() {
        assert!(validate_task_size(512, 1024).is_ok());
        assert!(validate_task_size(256, 512).is_ok());
        assert!(validate_task_size(4096, 30720).is_ok());
        assert_eq!(
            validate_task_size(512, 512),
            Err(ValidationError::InvalidTaskSize {
                cpu: 512,
                memory_mib: 512
            })
        );
        assert!(validate_task_size(1024, 2500).is_err());
        assert!(validate_task_size(300, 1024).is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(2, 10).is_ok());
        assert!(validate_capacity(0, 1).is_ok());
        assert!(validate_capacity(3, 2).is_err());
        assert!(validate_capacity(0, 0).is_err());

        assert!(validate_desired_count(2, 2, 10).is_ok());
        assert!(validate_desired_count(11, 2, 10).is_err());
    }

    #[test]
    fn test_validate_targets() {
        assert!(validate_utilization_target(70).is_ok());
        assert!(validate_utilization_target(0).is_err());
        assert!(validate_utilization_target(101).is_err());
        assert!(validate_request_target(70).is_ok());
        assert!(validate_request_target(0).is_err());
    }

    #[test]
    fn test_validate_capacity_weights() {
        let weights = vec![("FARGATE_SPOT".to_string(), 2), ("FARGATE".to_string(), 1)];
        assert!(validate_capacity_weights(&weights).is_ok());
        assert_eq!(
            validate_capacity_weights(&[("FARGATE".to_string(), 0)]),
            Err(ValidationError::NoCapacityProvider)
        );
        assert!(validate_capacity_weights(&[]).is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port(8080).is_ok());
        assert!(validate_port(0).is_err());
    }
}
