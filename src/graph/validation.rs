//! Connection validation.
//!
//! Checks run in a fixed order so the first violated rule is the one reported:
//! pin kinds, then type, then multiplicity, then size.

use crate::error::ConnectError;
use crate::param::{Parameter, PinKind};

/// Validates a connection from `source` to `target`.
///
/// # Connection Rules
///
/// | Check        | Requirement                                        |
/// |--------------|----------------------------------------------------|
/// | Source pin   | `Output`                                           |
/// | Target pin   | `Input`                                            |
/// | Type         | identical on both ends                             |
/// | Multiplicity | target holds fewer connections than it allows      |
/// | Size         | identical on both ends                             |
pub fn validate_connection(source: &Parameter, target: &Parameter) -> Result<(), ConnectError> {
    if !source.is_output() {
        return Err(ConnectError::WrongPinKind {
            parameter: source.name().to_string(),
            expected: PinKind::Output,
            found: source.pin_kind(),
        });
    }
    if !target.is_input() {
        return Err(ConnectError::WrongPinKind {
            parameter: target.name().to_string(),
            expected: PinKind::Input,
            found: target.pin_kind(),
        });
    }
    if source.ty() != target.ty() {
        return Err(ConnectError::TypeMismatch {
            output: source.ty(),
            input: target.ty(),
        });
    }
    let multiplicity = target.multiplicity();
    if !multiplicity.allows(target.connections().len()) {
        return Err(ConnectError::MultiplicityExceeded {
            parameter: target.name().to_string(),
            limit: multiplicity.limit().unwrap_or(usize::MAX),
        });
    }
    if source.size() != target.size() {
        return Err(ConnectError::SizeMismatch {
            output: source.size(),
            input: target.size(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConnectionId, NodeId};
    use crate::param::{Multiplicity, ParameterDefinition, ParameterType};
    use slotmap::SlotMap;

    fn param(def: ParameterDefinition) -> Parameter {
        Parameter::from_definition(NodeId::default(), def)
    }

    #[test]
    fn test_valid_connection() {
        let out = param(ParameterDefinition::float("Out", 0.0).output());
        let input = param(ParameterDefinition::float("In", 0.0).input());
        assert_eq!(validate_connection(&out, &input), Ok(()));
    }

    #[test]
    fn test_source_must_be_output() {
        let a = param(ParameterDefinition::float("A", 0.0).input());
        let b = param(ParameterDefinition::float("B", 0.0).input());
        assert_eq!(
            validate_connection(&a, &b),
            Err(ConnectError::WrongPinKind {
                parameter: "A".to_string(),
                expected: PinKind::Output,
                found: PinKind::Input,
            })
        );
    }

    #[test]
    fn test_target_must_be_input() {
        let out = param(ParameterDefinition::float("Out", 0.0).output());
        let plain = param(ParameterDefinition::float("Plain", 0.0));
        assert!(matches!(
            validate_connection(&out, &plain),
            Err(ConnectError::WrongPinKind { expected: PinKind::Input, .. })
        ));
    }

    #[test]
    fn test_type_checked_before_size() {
        let out = param(ParameterDefinition::int("Out", 0).output().with_size(3));
        let input = param(ParameterDefinition::float("In", 0.0).input());
        assert_eq!(
            validate_connection(&out, &input),
            Err(ConnectError::TypeMismatch {
                output: ParameterType::Int,
                input: ParameterType::Float,
            })
        );
    }

    #[test]
    fn test_size_mismatch() {
        let out = param(ParameterDefinition::float("Out", 0.0).output().with_size(3));
        let input = param(ParameterDefinition::float("In", 0.0).input().with_size(2));
        assert_eq!(
            validate_connection(&out, &input),
            Err(ConnectError::SizeMismatch { output: 3, input: 2 })
        );
    }

    #[test]
    fn test_multiplicity_limit() {
        let mut ids: SlotMap<ConnectionId, ()> = SlotMap::with_key();
        let out = param(ParameterDefinition::float("Out", 0.0).output());
        let mut input = param(ParameterDefinition::float("In", 0.0).input());
        input.add_connection(ids.insert(()));
        assert_eq!(
            validate_connection(&out, &input),
            Err(ConnectError::MultiplicityExceeded {
                parameter: "In".to_string(),
                limit: 1,
            })
        );

        let mut many = param(
            ParameterDefinition::float("Many", 0.0)
                .input()
                .with_multiplicity(Multiplicity::OneOrMore),
        );
        many.add_connection(ids.insert(()));
        many.add_connection(ids.insert(()));
        assert_eq!(validate_connection(&out, &many), Ok(()));
    }
}
