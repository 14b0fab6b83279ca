use fieldview_common::{Color, FieldPoint, GroupId};

/// One appended set of points sharing a colour and a draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveGroup {
    pub id: GroupId,
    pub points: Vec<FieldPoint>,
    pub color: Color,
}

impl PrimitiveGroup {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Append-only collection of primitive groups. Cleared only wholesale.
///
/// Mutation is crate-private: readers (renderers, overlays) get `&RenderBatch`.
#[derive(Debug, Clone, Default)]
pub struct RenderBatch {
    groups: Vec<PrimitiveGroup>,
    point_count: usize,
}

impl RenderBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, group: PrimitiveGroup) -> GroupId {
        let id = group.id;
        self.point_count += group.len();
        self.groups.push(group);
        id
    }

    /// Release every group. Returns how many were released.
    pub(crate) fn clear(&mut self) -> usize {
        let released = self.groups.len();
        self.groups.clear();
        self.point_count = 0;
        released
    }

    /// Groups in append order.
    pub fn groups(&self) -> &[PrimitiveGroup] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&PrimitiveGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.group(id).is_some()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total points across all groups.
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every point with its colour, in append order.
    pub fn points(&self) -> impl Iterator<Item = (&FieldPoint, Color)> {
        self.groups
            .iter()
            .flat_map(|g| g.points.iter().map(move |p| (p, g.color)))
    }
}
