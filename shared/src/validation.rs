//! Validation utilities for the Block Inventory Platform
//!
//! Request structs derive `validator::Validate` for the declarative checks;
//! the helpers below cover what the derive cannot express (strictly
//! positive floats, trimmed names, non-empty id lists).

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::models::{BlockTypeInput, NewBlock, SupplierInput};
use crate::types::BlockId;

/// A single failed check, reported against one request field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Pick the first failing field out of a `validator` report
pub fn first_field_error(errors: &ValidationErrors) -> FieldError {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(name, _)| *name);

    for (field, kind) in fields {
        if let ValidationErrorsKind::Field(list) = kind {
            if let Some(error) = list.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                return FieldError::new(wire_name(field), message);
            }
        }
    }

    FieldError::new("body", "Request body is invalid")
}

/// Request bodies are camelCase; `validator` reports Rust field names
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

fn check<T: Validate>(input: &T) -> Result<(), FieldError> {
    input.validate().map_err(|e| first_field_error(&e))
}

/// Validate that a measurement is a finite number above zero
pub fn validate_positive(field: &str, value: f64) -> Result<(), FieldError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::new(field, format!("{} must be greater than 0", field)))
    }
}

/// Validate block dimensions (millimetres)
pub fn validate_dimensions(height: f64, width: f64, length: f64) -> Result<(), FieldError> {
    validate_positive("height", height)?;
    validate_positive("width", width)?;
    validate_positive("length", length)
}

/// Validate a block type request, returning it with the name trimmed
pub fn validate_block_type_input(input: BlockTypeInput) -> Result<BlockTypeInput, FieldError> {
    let input = BlockTypeInput {
        block_name: input.block_name.trim().to_string(),
        density: input.density,
    };
    check(&input)?;
    validate_positive("density", input.density)?;
    Ok(input)
}

/// Validate a supplier request, returning it with the name trimmed
pub fn validate_supplier_input(input: SupplierInput) -> Result<SupplierInput, FieldError> {
    let input = SupplierInput {
        supplier_name: input.supplier_name.trim().to_string(),
    };
    check(&input)?;
    Ok(input)
}

/// Validate one entry of a bulk-create request
pub fn validate_new_block(block: &NewBlock) -> Result<(), FieldError> {
    check(block)?;
    validate_dimensions(block.height, block.width, block.length)
}

/// Validate a list of block ids for process/remove requests
pub fn validate_block_ids(ids: &[BlockId]) -> Result<(), FieldError> {
    if ids.is_empty() {
        return Err(FieldError::new("blockIds", "At least one block id is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_block(height: f64, width: f64, length: f64) -> NewBlock {
        NewBlock {
            block_type_id: 1,
            supplier_id: 1,
            height,
            width,
            length,
            quantity: 1,
        }
    }

    #[test]
    fn test_dimensions_must_be_positive() {
        assert!(validate_dimensions(1.0, 1.0, 1.0).is_ok());
        assert_eq!(validate_dimensions(0.0, 1.0, 1.0).unwrap_err().field, "height");
        assert_eq!(validate_dimensions(1.0, -5.0, 1.0).unwrap_err().field, "width");
        assert_eq!(validate_dimensions(1.0, 1.0, f64::NAN).unwrap_err().field, "length");
    }

    #[test]
    fn test_new_block_validation() {
        assert!(validate_new_block(&new_block(1600.0, 1200.0, 2000.0)).is_ok());
        assert!(validate_new_block(&new_block(1600.0, 0.0, 2000.0)).is_err());

        let mut zero_quantity = new_block(1.0, 1.0, 1.0);
        zero_quantity.quantity = 0;
        assert_eq!(validate_new_block(&zero_quantity).unwrap_err().field, "quantity");
    }

    #[test]
    fn test_block_type_name_is_trimmed() {
        let input = validate_block_type_input(BlockTypeInput {
            block_name: "  Granite ".to_string(),
            density: 2700.0,
        })
        .unwrap();
        assert_eq!(input.block_name, "Granite");
    }

    #[test]
    fn test_block_type_rejects_blank_name_and_bad_density() {
        let blank = validate_block_type_input(BlockTypeInput {
            block_name: "   ".to_string(),
            density: 2700.0,
        });
        assert_eq!(blank.unwrap_err().field, "blockName");

        let density = validate_block_type_input(BlockTypeInput {
            block_name: "Granite".to_string(),
            density: 0.0,
        });
        assert_eq!(density.unwrap_err().field, "density");
    }

    #[test]
    fn test_supplier_name_required() {
        let result = validate_supplier_input(SupplierInput {
            supplier_name: String::new(),
        });
        assert_eq!(result.unwrap_err().field, "supplierName");
    }

    #[test]
    fn test_reference_ids_reported_in_camel_case() {
        let mut block = new_block(1.0, 1.0, 1.0);
        block.block_type_id = 0;
        assert_eq!(validate_new_block(&block).unwrap_err().field, "blockTypeId");

        let mut block = new_block(1.0, 1.0, 1.0);
        block.supplier_id = -3;
        assert_eq!(validate_new_block(&block).unwrap_err().field, "supplierId");
    }

    #[test]
    fn test_wire_name() {
        assert_eq!(wire_name("block_type_id"), "blockTypeId");
        assert_eq!(wire_name("quantity"), "quantity");
    }

    #[test]
    fn test_block_ids_required() {
        assert!(validate_block_ids(&[]).is_err());
        assert!(validate_block_ids(&[BlockId(1)]).is_ok());
    }
}
