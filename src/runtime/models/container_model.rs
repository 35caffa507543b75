//! # Container Model
//!
//! Ordered, exclusively owned children (fields or nested containers) with an
//! id index over the full descendant set. Each index entry is the child
//! position path from this container, so lookups cost O(depth).

use crate::runtime::errors::StructuralError;
use crate::runtime::events::{FieldCapabilities, FieldId, Validity};
use crate::runtime::models::field_model::FieldModel;
use std::collections::HashMap;

/// A node of the model tree
#[derive(Debug)]
pub enum ModelNode {
    Field(FieldModel),
    Container(ContainerModel),
}

impl ModelNode {
    pub fn id(&self) -> &FieldId {
        match self {
            ModelNode::Field(field) => field.id(),
            ModelNode::Container(container) => container.id(),
        }
    }

    pub fn as_field(&self) -> Option<&FieldModel> {
        match self {
            ModelNode::Field(field) => Some(field),
            ModelNode::Container(_) => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut FieldModel> {
        match self {
            ModelNode::Field(field) => Some(field),
            ModelNode::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerModel> {
        match self {
            ModelNode::Container(container) => Some(container),
            ModelNode::Field(_) => None,
        }
    }
}

impl From<FieldModel> for ModelNode {
    fn from(field: FieldModel) -> Self {
        ModelNode::Field(field)
    }
}

impl From<ContainerModel> for ModelNode {
    fn from(container: ContainerModel) -> Self {
        ModelNode::Container(container)
    }
}

#[derive(Debug)]
pub struct ContainerModel {
    id: FieldId,
    name: String,
    title: Option<String>,
    children: Vec<ModelNode>,
    index: HashMap<FieldId, Vec<usize>>,
}

impl ContainerModel {
    /// Build a container, indexing every descendant. Fails on duplicate ids
    /// anywhere in the subtree, including the container's own id.
    pub fn new(
        id: FieldId,
        name: impl Into<String>,
        children: Vec<ModelNode>,
    ) -> Result<Self, StructuralError> {
        let mut index: HashMap<FieldId, Vec<usize>> = HashMap::new();

        for (position, child) in children.iter().enumerate() {
            Self::insert_unique(&mut index, child.id().clone(), vec![position])?;

            if let ModelNode::Container(container) = child {
                for (descendant, path) in &container.index {
                    let mut full_path = Vec::with_capacity(path.len() + 1);
                    full_path.push(position);
                    full_path.extend_from_slice(path);
                    Self::insert_unique(&mut index, descendant.clone(), full_path)?;
                }
            }
        }

        if index.contains_key(&id) {
            return Err(StructuralError::DuplicateId(id));
        }

        Ok(Self {
            id,
            name: name.into(),
            title: None,
            children,
            index,
        })
    }

    fn insert_unique(
        index: &mut HashMap<FieldId, Vec<usize>>,
        id: FieldId,
        path: Vec<usize>,
    ) -> Result<(), StructuralError> {
        if index.contains_key(&id) {
            return Err(StructuralError::DuplicateId(id));
        }
        index.insert(id, path);
        Ok(())
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Direct children, in definition order
    pub fn items(&self) -> &[ModelNode] {
        &self.children
    }

    /// Children for in-place mutation. Replacing a node would invalidate the
    /// id index, so this stays crate-private.
    pub(crate) fn children_mut(&mut self) -> std::slice::IterMut<'_, ModelNode> {
        self.children.iter_mut()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Resolve any descendant by id; `None` means "not part of this tree"
    pub fn get_element(&self, id: &str) -> Option<&ModelNode> {
        let path = self.index.get(id)?;
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for position in rest {
            node = match node {
                ModelNode::Container(container) => container.children.get(*position)?,
                ModelNode::Field(_) => return None,
            };
        }
        Some(node)
    }

    pub fn get_element_mut(&mut self, id: &str) -> Option<&mut ModelNode> {
        let path = self.index.get(id)?.clone();
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for position in rest {
            node = match node {
                ModelNode::Container(container) => container.children.get_mut(*position)?,
                ModelNode::Field(_) => return None,
            };
        }
        Some(node)
    }

    /// Resolve a descendant field, distinguishing "absent" from "a container"
    pub fn field(&self, id: &str) -> Result<&FieldModel, StructuralError> {
        match self.get_element(id) {
            Some(ModelNode::Field(field)) => Ok(field),
            Some(ModelNode::Container(_)) => Err(StructuralError::NotAField(FieldId::new(id))),
            None => Err(StructuralError::UnknownModel(FieldId::new(id))),
        }
    }

    pub fn field_mut(&mut self, id: &str) -> Result<&mut FieldModel, StructuralError> {
        match self.get_element_mut(id) {
            Some(ModelNode::Field(field)) => Ok(field),
            Some(ModelNode::Container(_)) => Err(StructuralError::NotAField(FieldId::new(id))),
            None => Err(StructuralError::UnknownModel(FieldId::new(id))),
        }
    }

    /// All leaf fields in document order
    pub fn fields(&self) -> Vec<&FieldModel> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut Vec<&'a FieldModel>) {
        for child in &self.children {
            match child {
                ModelNode::Field(field) => fields.push(field),
                ModelNode::Container(container) => container.collect_fields(fields),
            }
        }
    }

    pub fn field_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                ModelNode::Field(_) => 1,
                ModelNode::Container(container) => container.field_count(),
            })
            .sum()
    }

    /// Visit every leaf field mutably, in document order
    pub fn for_each_field_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut FieldModel),
    {
        for child in &mut self.children {
            match child {
                ModelNode::Field(field) => visit(field),
                ModelNode::Container(container) => container.for_each_field_mut(visit),
            }
        }
    }

    /// Container chain enclosing `id`, nearest first, ending with this
    /// container. `None` when `id` is not a descendant.
    pub fn ancestors(&self, id: &str) -> Option<Vec<&FieldId>> {
        let path = self.index.get(id)?;
        let mut chain = vec![&self.id];
        let mut current = self;
        for position in &path[..path.len().saturating_sub(1)] {
            match current.children.get(*position)? {
                ModelNode::Container(container) => {
                    chain.push(&container.id);
                    current = container;
                }
                ModelNode::Field(_) => return None,
            }
        }
        chain.reverse();
        Some(chain)
    }

    /// Nearest container enclosing `id`
    pub fn container_of(&self, id: &str) -> Option<&FieldId> {
        self.ancestors(id)?.into_iter().next()
    }

    /// AND over the validity of every participating (visible and enabled)
    /// descendant field
    pub fn is_valid(&self) -> bool {
        self.fields().into_iter().all(|field| {
            !field.capabilities().contains(FieldCapabilities::VALIDATES)
                || field.validity() != Validity::Invalid
        })
    }
}
