// src/model.rs
//! Recipe domain types
//!
//! These are the JSON shapes accepted and returned by the HTTP API and
//! the values stored by the repository.

use serde::{Deserialize, Serialize};

/// A recipe with its ordered steps and ingredient quantities
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Recipe {
    /// Database id; None for recipes not yet stored
    pub id: Option<u32>,
    pub name: String,
    pub desc: Option<String>,
    pub steps: Vec<String>,
    pub ingredients: Vec<IngredientQuantity>,
}

/// An amount of something, e.g. 2.5 "cups"
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

/// An ingredient together with how much of it a recipe uses
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct IngredientQuantity {
    pub ingredient: String,
    pub quantity: Quantity,
}

impl Recipe {
    /// Create an unsaved recipe with no steps or ingredients
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            desc: None,
            steps: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    /// Builder-style description setter
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Builder-style step appender
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Builder-style ingredient appender
    pub fn with_ingredient(
        mut self,
        ingredient: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
    ) -> Self {
        self.ingredients.push(IngredientQuantity {
            ingredient: ingredient.into(),
            quantity: Quantity {
                value,
                unit: unit.into(),
            },
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let recipe = Recipe::new("Mash")
            .with_desc("Buttery")
            .with_step("Boil")
            .with_ingredient("Potato", 1.0, "whole");

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": null,
                "name": "Mash",
                "desc": "Buttery",
                "steps": ["Boil"],
                "ingredients": [
                    {"ingredient": "Potato", "quantity": {"value": 1.0, "unit": "whole"}}
                ]
            })
        );
    }

    #[test]
    fn test_missing_optional_fields() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"name": "Toast", "steps": [], "ingredients": []}"#,
        )
        .unwrap();
        assert_eq!(recipe, Recipe::new("Toast"));
    }
}
