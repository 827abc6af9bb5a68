use serde::Serialize;

use super::todo::Todo;
use super::view::GroupLevel;

/// Display counts attached to every group node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub total: usize,
    /// Open todos that are urgent
    pub urgent: usize,
    pub overdue: usize,
    /// Not tracked for status groups, where it would repeat the label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<usize>,
}

/// A node of the grouped view. The variant is decided when the node is built:
/// branches hold the next grouping level, leaves hold sorted todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GroupNode<'a> {
    Branch {
        label: String,
        level: GroupLevel,
        summary: GroupSummary,
        children: Vec<GroupNode<'a>>,
    },
    Leaf {
        label: String,
        level: GroupLevel,
        summary: GroupSummary,
        todos: Vec<&'a Todo>,
    },
}

impl<'a> GroupNode<'a> {
    pub fn label(&self) -> &str {
        match self {
            GroupNode::Branch { label, .. } | GroupNode::Leaf { label, .. } => label,
        }
    }

    pub fn level(&self) -> GroupLevel {
        match self {
            GroupNode::Branch { level, .. } | GroupNode::Leaf { level, .. } => *level,
        }
    }

    pub fn summary(&self) -> &GroupSummary {
        match self {
            GroupNode::Branch { summary, .. } | GroupNode::Leaf { summary, .. } => summary,
        }
    }

    /// All todos below this node, in display order
    pub fn todos(&self) -> Vec<&'a Todo> {
        let mut out = Vec::new();
        self.collect_todos(&mut out);
        out
    }

    fn collect_todos(&self, out: &mut Vec<&'a Todo>) {
        match self {
            GroupNode::Branch { children, .. } => {
                for child in children {
                    child.collect_todos(out);
                }
            }
            GroupNode::Leaf { todos, .. } => out.extend(todos.iter().copied()),
        }
    }
}

/// One row of a rendered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem<'a> {
    Todo(&'a Todo),
    Group {
        label: String,
        summary: GroupSummary,
    },
    /// Groups at a project level render as projects
    Project {
        name: String,
        summary: GroupSummary,
    },
}

/// Depth-first rows for a forest, each paired with its nesting depth.
pub fn flatten_forest<'a>(forest: &[GroupNode<'a>]) -> Vec<(usize, TreeItem<'a>)> {
    let mut rows = Vec::new();
    for node in forest {
        flatten_node(node, 0, &mut rows);
    }
    rows
}

fn flatten_node<'a>(node: &GroupNode<'a>, depth: usize, rows: &mut Vec<(usize, TreeItem<'a>)>) {
    let header = match node.level() {
        GroupLevel::Project => TreeItem::Project {
            name: node.label().to_string(),
            summary: *node.summary(),
        },
        _ => TreeItem::Group {
            label: node.label().to_string(),
            summary: *node.summary(),
        },
    };
    rows.push((depth, header));

    match node {
        GroupNode::Branch { children, .. } => {
            for child in children {
                flatten_node(child, depth + 1, rows);
            }
        }
        GroupNode::Leaf { todos, .. } => {
            rows.extend(todos.iter().map(|todo| (depth + 1, TreeItem::Todo(todo))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn flatten_marks_project_groups() {
        let now = Utc::now();
        let a = Todo::new("a", now);
        let b = Todo::new("b", now);
        let forest = vec![GroupNode::Branch {
            label: "Urgent".into(),
            level: GroupLevel::Status,
            summary: GroupSummary::default(),
            children: vec![GroupNode::Leaf {
                label: "Work".into(),
                level: GroupLevel::Project,
                summary: GroupSummary::default(),
                todos: vec![&a, &b],
            }],
        }];

        let rows = flatten_forest(&forest);
        assert_eq!(rows.len(), 4);
        assert!(matches!(rows[0], (0, TreeItem::Group { ref label, .. }) if label == "Urgent"));
        assert!(matches!(rows[1], (1, TreeItem::Project { ref name, .. }) if name == "Work"));
        assert_eq!(rows[2], (2, TreeItem::Todo(&a)));
        assert_eq!(rows[3], (2, TreeItem::Todo(&b)));
        assert_eq!(forest[0].todos(), vec![&a, &b]);
    }
}
