//! JavaScript snippets reproducing a member chain with the UTAM runtime

use crate::inspector::node_map::MemberNode;
use crate::pageobject::types::ArgValue;

const ROOT_VAR: &str = "root";

/// Render the call chain leading to the last node of `path`
///
/// `path` starts at a page-object root node. Returns `None` for an empty path.
pub fn render(path: &[&MemberNode]) -> Option<String> {
    let (root, members) = path.split_first()?;
    let class = class_name(&root.uri);

    let mut lines = vec![
        format!("import {} from '{}';", class, root.uri),
        format!("const {} = await utam.load({});", ROOT_VAR, class),
    ];

    let mut expr = ROOT_VAR.to_string();
    for (i, node) in members.iter().enumerate() {
        let call = format!("{}.{}({})", expr, node.display_name, render_args(&node.args));
        expr = if i + 1 < members.len() { format!("(await {})", call) } else { call };
    }
    if !members.is_empty() {
        lines.push(format!("await {};", expr));
    }

    Some(lines.join("\n"))
}

/// PascalCase class name from the last URI segment
pub fn class_name(uri: &str) -> String {
    let segment = uri.rsplit('/').next().unwrap_or(uri);
    segment
        .split(['-', '_', '.'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn render_args(args: &[ArgValue]) -> String {
    args.iter()
        .map(|arg| match &arg.value {
            Some(value) if !value.is_null() => value.to_string(),
            _ => arg.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, args: Vec<ArgValue>) -> MemberNode {
        MemberNode {
            member_name: Some(name.to_string()),
            display_name: name.to_string(),
            args,
            ..MemberNode::root("utam-demo/pageObjects/fruit-list", None)
        }
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("utam-demo/pageObjects/fruit-list"), "FruitList");
        assert_eq!(class_name("a/list_item"), "ListItem");
        assert_eq!(class_name("page"), "Page");
    }

    #[test]
    fn test_render_root_only() {
        let root = MemberNode::root("a/list", None);
        assert_eq!(
            render(&[&root]).unwrap(),
            "import List from 'a/list';\nconst root = await utam.load(List);"
        );
        assert!(render(&[]).is_none());
    }

    #[test]
    fn test_render_chain_with_args() {
        let root = MemberNode::root("utam-demo/pageObjects/fruit-list", None);
        let items = member("getItems", vec![ArgValue::new("index", 2), ArgValue::unbound("label")]);
        let click = member("click", Vec::new());

        let snippet = render(&[&root, &items, &click]).unwrap();
        assert_eq!(
            snippet.lines().last(),
            Some("await (await root.getItems(2, label)).click();")
        );

        let text = member("getText", Vec::new());
        let with_string = member("getItem", vec![ArgValue::new("name", "Banana")]);
        let snippet = render(&[&root, &with_string, &text]).unwrap();
        assert!(snippet.ends_with("await (await root.getItem(\"Banana\")).getText();"));
    }
}
