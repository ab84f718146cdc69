//! Page-object definitions and their resolved member model

pub mod database;
pub mod definition;
pub mod intrinsic;
pub mod member;
pub mod resolver;
pub mod types;

pub use database::{
    DatabaseSnapshot, DefinitionSource, DirectorySource, InMemorySource, PageObjectDatabase, intrinsic_members,
};
pub use definition::{DeclaredType, PageObjectDefinition};
pub use intrinsic::{IntrinsicCatalog, IntrinsicMethod, catalog};
pub use member::{
    ElementDescriptor, FilterDescriptor, MatcherType, Member, MethodDescriptor, ParsedPageObject, ResolutionState,
    SelectorDescriptor,
};
pub use resolver::Resolver;
pub use types::{ArgDescriptor, ArgType, ArgValue, Category, PrimitiveType, TypeRef};
