//! 菜单树构建
//!
//! 节点存放在按输入顺序排列的 arena 中，父子关系只记录下标，
//! 输出时才物化为嵌套的 `MenuNode`。
//!
//! 规则:
//! 1. 重复 ID 只保留第一次出现的菜单
//! 2. 父菜单不在输入中（停用、隐藏或悬空引用）的菜单提升为顶级
//! 3. 父链成环的菜单中，输入顺序最靠前的成员被断开并提升为顶级
//! 4. 顶级与子级都保持输入顺序
//!
//! 父链深度不受调用栈限制：构建、展开与释放都使用显式栈

use std::collections::HashMap;

use serde::Serialize;

use super::menu::Menu;

/// 菜单树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new(menu: Menu) -> Self {
        Self {
            menu,
            children: Vec::new(),
        }
    }

    /// 前序展开为扁平列表
    pub fn flatten(&self) -> Vec<Menu> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.menu.clone());
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// 子树中的节点总数
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for MenuNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// 前序展开整片森林
pub fn flatten_forest(roots: &[MenuNode]) -> Vec<Menu> {
    roots.iter().flat_map(MenuNode::flatten).collect()
}

/// 由扁平菜单序列构建菜单森林，只返回顶级节点
///
/// 纯函数：相同的输入序列总是得到相同的树形与顺序
pub fn build_tree(menus: &[Menu]) -> Vec<MenuNode> {
    let mut arena: Vec<&Menu> = Vec::with_capacity(menus.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(menus.len());
    for menu in menus {
        if !index.contains_key(menu.id.as_str()) {
            index.insert(menu.id.as_str(), arena.len());
            arena.push(menu);
        }
    }

    let mut parent: Vec<Option<usize>> = arena
        .iter()
        .map(|menu| {
            menu.parent_id
                .as_ref()
                .and_then(|id| index.get(id.as_str()).copied())
        })
        .collect();

    detach_cycles(&mut parent);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); arena.len()];
    let mut roots = Vec::new();
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    materialize(&roots, &arena, &children)
}

/// 断开所有环，使每个节点最终都能追溯到某个顶级节点
fn detach_cycles(parent: &mut [Option<usize>]) {
    let n = parent.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, p) in parent.iter().enumerate() {
        if let Some(p) = p {
            children[*p].push(i);
        }
    }

    let mut reached = vec![false; n];
    for i in 0..n {
        if parent[i].is_none() {
            mark_reachable(i, &children, &mut reached);
        }
    }

    for i in 0..n {
        if reached[i] {
            continue;
        }

        // 未被任何顶级节点覆盖的节点，沿父链上溯必然进入一个环
        let mut path: Vec<usize> = Vec::new();
        let mut position: HashMap<usize, usize> = HashMap::new();
        let mut current = i;
        let cycle_start = loop {
            if let Some(&pos) = position.get(&current) {
                break pos;
            }
            position.insert(current, path.len());
            path.push(current);
            match parent[current] {
                Some(p) => current = p,
                None => break path.len(),
            }
        };

        let Some(&head) = path[cycle_start..].iter().min() else {
            continue;
        };
        if let Some(old_parent) = parent[head].take() {
            children[old_parent].retain(|&c| c != head);
        }
        mark_reachable(head, &children, &mut reached);
    }
}

fn mark_reachable(start: usize, children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(i) = stack.pop() {
        if reached[i] {
            continue;
        }
        reached[i] = true;
        stack.extend(children[i].iter().copied());
    }
}

/// 自底向上物化：子节点总是先于父节点构建
fn materialize(roots: &[usize], arena: &[&Menu], children: &[Vec<usize>]) -> Vec<MenuNode> {
    let mut order = Vec::with_capacity(arena.len());
    let mut stack = roots.to_vec();
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().copied());
    }

    let mut built: Vec<Option<MenuNode>> = (0..arena.len()).map(|_| None).collect();
    for &i in order.iter().rev() {
        let nodes = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(MenuNode {
            menu: arena[i].clone(),
            children: nodes,
        });
    }

    roots.iter().filter_map(|&i| built[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::MenuId;

    fn menu(id: &str, parent: Option<&str>) -> Menu {
        let menu = Menu::new(id.to_string()).with_id(MenuId::from(id));
        match parent {
            Some(p) => menu.with_parent(MenuId::from(p)),
            None => menu,
        }
    }

    fn ids(nodes: &[MenuNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.menu.id.as_str()).collect()
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let menus = vec![
            menu("m1", None),
            menu("m2", Some("m1")),
            menu("m3", Some("missing")),
        ];

        let roots = build_tree(&menus);

        assert_eq!(ids(&roots), vec!["m1", "m3"]);
        assert_eq!(ids(&roots[0].children), vec!["m2"]);
        assert!(roots[1].is_leaf());
    }

    #[test]
    fn test_child_before_parent_in_input() {
        let menus = vec![menu("c", Some("p")), menu("p", None), menu("c2", Some("p"))];

        let roots = build_tree(&menus);

        assert_eq!(ids(&roots), vec!["p"]);
        assert_eq!(ids(&roots[0].children), vec!["c", "c2"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let menus = vec![menu("a", None), menu("b", Some("a")), menu("a", Some("b"))];

        let roots = build_tree(&menus);

        assert_eq!(ids(&roots), vec!["a"]);
        assert_eq!(flatten_forest(&roots).len(), 2);
    }

    #[test]
    fn test_self_parent_is_promoted() {
        let roots = build_tree(&[menu("loop", Some("loop"))]);

        assert_eq!(ids(&roots), vec!["loop"]);
        assert!(roots[0].is_leaf());
    }

    #[test]
    fn test_cycle_first_member_in_input_is_detached() {
        let menus = vec![
            menu("root", None),
            menu("x", Some("z")),
            menu("y", Some("x")),
            menu("z", Some("y")),
            menu("tail", Some("y")),
        ];

        let roots = build_tree(&menus);

        assert_eq!(ids(&roots), vec!["root", "x"]);
        assert_eq!(roots[1].len(), 4);
        assert_eq!(ids(&roots[1].children), vec!["y"]);
        assert_eq!(ids(&roots[1].children[0].children), vec!["z", "tail"]);
    }

    #[test]
    fn test_hanging_branch_off_cycle_detaches_cycle_member() {
        // a 挂在环 b <-> c 上，断开的应是环中最靠前的 b
        let menus = vec![menu("a", Some("b")), menu("b", Some("c")), menu("c", Some("b"))];

        let roots = build_tree(&menus);

        assert_eq!(ids(&roots), vec!["b"]);
        assert_eq!(ids(&roots[0].children), vec!["a", "c"]);
    }

    #[test]
    fn test_flatten_is_pre_order() {
        let menus = vec![
            menu("m1", None),
            menu("m2", None),
            menu("m1a", Some("m1")),
            menu("m1a1", Some("m1a")),
            menu("m1b", Some("m1")),
        ];

        let flat: Vec<String> = flatten_forest(&build_tree(&menus))
            .into_iter()
            .map(|m| m.id.0)
            .collect();

        assert_eq!(flat, vec!["m1", "m1a", "m1a1", "m1b", "m2"]);
    }

    #[test]
    fn test_rebuild_from_flattened_output_is_identical() {
        let menus = vec![
            menu("c", Some("p")),
            menu("orphan", Some("gone")),
            menu("p", None),
            menu("x", Some("y")),
            menu("y", Some("x")),
            menu("c2", Some("p")),
        ];

        let first = build_tree(&menus);
        let second = build_tree(&flatten_forest(&first));

        assert_eq!(first, second);
        assert_eq!(build_tree(&menus), first);
    }

    #[test]
    fn test_serialized_node_carries_children() {
        let roots = build_tree(&[menu("m1", None), menu("m2", Some("m1"))]);
        let json = serde_json::to_value(&roots).unwrap();

        assert_eq!(json[0]["id"], "m1");
        assert_eq!(json[0]["children"][0]["parentId"], "m1");
    }

    #[test]
    fn test_deep_parent_chain() {
        const DEPTH: usize = 100_000;
        let menus: Vec<Menu> = (0..DEPTH)
            .map(|i| {
                let id = format!("m{i}");
                let parent = i.checked_sub(1).map(|p| format!("m{p}"));
                menu(&id, parent.as_deref())
            })
            .collect();

        let roots = build_tree(&menus);

        assert_eq!(ids(&roots), vec!["m0"]);
        assert_eq!(roots[0].len(), DEPTH);

        let flat = flatten_forest(&roots);
        assert_eq!(flat.len(), DEPTH);
        assert_eq!(flat[DEPTH - 1].id.as_str(), "m99999");
    }
}
