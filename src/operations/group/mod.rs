mod barycenter;
mod membership;
mod transform;

pub use barycenter::RecalculateBarycenter;
pub use membership::{
    AddToGroup, CreateGroup, CreateGroupFromSelection, RemoveFromGroup, RemoveGroup,
    RemoveGroupAndDeleteElements, SelectGroup,
};
pub use transform::{RotateGroup, TranslateGroup};
