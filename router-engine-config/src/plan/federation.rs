use serde::Serialize;

use crate::source;

/// Federation declarations of one data source, in the shape the planner consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FederationMetaData {
    pub keys: Vec<FederationFieldConfiguration>,
    pub requires: Vec<FederationFieldConfiguration>,
    pub provides: Vec<FederationFieldConfiguration>,
    pub entity_interfaces: Vec<EntityInterfaceConfiguration>,
    pub interface_objects: Vec<EntityInterfaceConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FederationFieldConfiguration {
    pub type_name: String,
    pub field_name: String,
    pub selection_set: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityInterfaceConfiguration {
    pub interface_type_name: String,
    pub concrete_type_names: Vec<String>,
}

impl From<&source::RequiredField> for FederationFieldConfiguration {
    fn from(field: &source::RequiredField) -> Self {
        Self {
            type_name: field.type_name.clone(),
            field_name: field.field_name.clone(),
            selection_set: field.selection_set.clone(),
        }
    }
}

impl From<&source::EntityInterfaceConfiguration> for EntityInterfaceConfiguration {
    fn from(interface: &source::EntityInterfaceConfiguration) -> Self {
        Self {
            interface_type_name: interface.interface_type_name.clone(),
            concrete_type_names: interface.concrete_type_names.clone(),
        }
    }
}

/// Copy the federation declarations of a data source.
///
/// Selection sets and interface coverage are taken as composed; nothing is validated or
/// de-duplicated here.
pub fn assemble(data_source: &source::DataSourceConfiguration) -> FederationMetaData {
    FederationMetaData {
        keys: data_source.keys.iter().map(Into::into).collect(),
        requires: data_source.requires.iter().map(Into::into).collect(),
        provides: data_source.provides.iter().map(Into::into).collect(),
        entity_interfaces: data_source
            .entity_interfaces
            .iter()
            .map(Into::into)
            .collect(),
        interface_objects: data_source
            .interface_objects
            .iter()
            .map(Into::into)
            .collect(),
    }
}
