//! Attribute mapping between two schema generations

use std::fmt;

use crate::model::{PathAddress, ResourceRegistration};

/// Attribute names per address, collected from a registration tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    address: PathAddress,
    attributes: Vec<String>,
    children: Vec<Model>,
}

impl Model {
    pub fn from_registration(registration: &ResourceRegistration) -> Self {
        Self::collect(registration, PathAddress::empty())
    }

    fn collect(registration: &ResourceRegistration, address: PathAddress) -> Self {
        let children = registration
            .child_addresses()
            .into_iter()
            .filter_map(|element| {
                registration
                    .child(element)
                    .map(|child| Self::collect(child, address.append(element.clone())))
            })
            .collect();
        Self {
            attributes: registration
                .attribute_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            address,
            children,
        }
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn children(&self) -> &[Model] {
        &self.children
    }

    /// Depth-first search for the first node declaring `attribute`
    fn find_attribute(&self, attribute: &str) -> Option<&PathAddress> {
        if self.attributes.iter().any(|a| a == attribute) {
            return Some(&self.address);
        }
        self.children
            .iter()
            .find_map(|child| child.find_attribute(attribute))
    }

    fn visit<'m>(&'m self, out: &mut Vec<(&'m PathAddress, &'m str)>) {
        for attribute in &self.attributes {
            out.push((&self.address, attribute));
        }
        for child in &self.children {
            child.visit(out);
        }
    }
}

/// Where a legacy attribute's value comes from in the current model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRule {
    pub current_address: PathAddress,
    pub current_attribute: String,
    pub legacy_address: PathAddress,
    pub legacy_attribute: String,
}

impl fmt::Display for AttributeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {}",
            self.current_address, self.current_attribute, self.legacy_address, self.legacy_attribute
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModelMatcher;

impl ModelMatcher {
    /// Rules mapping attributes of `current` onto attributes of `legacy`
    ///
    /// Structurally identical trees get one identity rule per attribute.
    /// Otherwise each legacy attribute is mapped to the first attribute of
    /// the same name found depth-first in the current tree; legacy
    /// attributes without a match get no rule. Names are matched exactly:
    /// [`super::similarity::SimilarityIndex`] scores are not consulted.
    pub fn get_rules(current: &ResourceRegistration, legacy: &ResourceRegistration) -> Vec<AttributeRule> {
        let current = Model::from_registration(current);
        let legacy = Model::from_registration(legacy);

        let mut legacy_attributes = Vec::new();
        legacy.visit(&mut legacy_attributes);

        if current == legacy {
            return legacy_attributes
                .into_iter()
                .map(|(address, attribute)| AttributeRule {
                    current_address: address.clone(),
                    current_attribute: attribute.to_string(),
                    legacy_address: address.clone(),
                    legacy_attribute: attribute.to_string(),
                })
                .collect();
        }

        legacy_attributes
            .into_iter()
            .filter_map(|(address, attribute)| {
                current
                    .find_attribute(attribute)
                    .map(|found| AttributeRule {
                        current_address: found.clone(),
                        current_attribute: attribute.to_string(),
                        legacy_address: address.clone(),
                        legacy_attribute: attribute.to_string(),
                    })
            })
            .collect()
    }
}
