use crate::sgf::{
    cursor::MoveTree,
    properties::Properties,
};

/// Serialise the whole tree behind `tree` (from its root, regardless of the
/// cursor position) back to SGF text.
pub fn write_sgf(tree: &MoveTree) -> String {
    let mut mt = tree.tree_from_root();
    let mut out = String::from("(");
    write_node(&mut mt, &mut out);
    out.push(')');
    out
}

/// Write a single node (`;` followed by its properties) and then recurse.
///
/// Branching rules:
/// - **0 children**: nothing more to emit.
/// - **1 child**: continue inline (no extra parentheses).
/// - **2+ children**: each child is a separate variation, wrapped in `(…)`.
fn write_node(mt: &mut MoveTree, out: &mut String) {
    out.push(';');
    write_properties(&mt.properties(), out);
    match mt.num_children() {
        0 => {}
        1 => {
            mt.move_down(0);
            write_node(mt, out);
            mt.move_up();
        }
        n => {
            for i in 0..n {
                out.push('(');
                mt.move_down(i);
                write_node(mt, out);
                mt.move_up();
                out.push(')');
            }
        }
    }
}

fn write_properties(props: &Properties, out: &mut String) {
    for (key, values) in props.iter() {
        out.push_str(key.as_str());
        for value in values {
            out.push('[');
            for c in value.chars() {
                if c == ']' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push(']');
        }
    }
}
