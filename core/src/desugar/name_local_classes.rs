//! Gives anonymous and local classes binary names.
//!
//! Names are numbered per immediately enclosing class starting at 1, in
//! source order: `Outer$1` for an anonymous class, `Outer$2Local` for a
//! local class `Local`. An anonymous class extending an interface gets
//! `java.lang.Object` as its superclass and the interface as its only
//! interface.

use std::collections::{HashMap, HashSet};

use log::trace;

use super::err::DesugarError;
use super::util::{is_anonymous_decl, rename_classes, take};
use super::{Stage, StageContext};
use crate::ast::visit::map_children;
use crate::ast::{AstNode, AstNodeKind};
use crate::types::OBJECT_CLASS;

pub struct NameLocalClasses;

impl Stage for NameLocalClasses {
    fn name(&self) -> &'static str {
        "name-local-classes"
    }

    fn run(&self, unit: AstNode, cx: &StageContext<'_>) -> Result<AstNode, DesugarError> {
        let mut namer = Namer { cx, counters: HashMap::new(), local_classes: HashSet::new() };
        namer.visit(unit, None)
    }
}

struct Namer<'c, 'a> {
    cx: &'c StageContext<'a>,
    counters: HashMap<String, usize>,
    /// Local classes named so far; the type system does not know them yet.
    local_classes: HashSet<String>,
}

impl Namer<'_, '_> {
    fn fresh_name(&mut self, enclosing: &str, simple: &str) -> String {
        let counter = self.counters.entry(enclosing.to_string()).or_insert(0);
        *counter += 1;
        format!("{}${}{}", enclosing, counter, simple)
    }

    fn is_interface(&self, class: &str) -> Result<bool, DesugarError> {
        if self.local_classes.contains(class) {
            return Ok(false);
        }
        self.cx
            .ts
            .type_for_name(class)
            .map(|info| info.is_interface)
            .map_err(|e| DesugarError::missing_dependency(&e))
    }

    fn visit(&mut self, node: AstNode, enclosing: Option<&str>) -> Result<AstNode, DesugarError> {
        match &node.kind {
            AstNodeKind::ClassDecl { name, .. } if !name.is_empty() => {
                let name = name.clone();
                map_children(node, &mut |child| self.visit(child, Some(name.as_str())))
            }
            AstNodeKind::Block { .. } => self.visit_block(node, enclosing),
            AstNodeKind::New { body: Some(body), .. } if is_anonymous_decl(body) => self.name_anonymous(node, enclosing),
            _ => map_children(node, &mut |child| self.visit(child, enclosing)),
        }
    }

    /// A local class is visible from its declaration to the end of the
    /// block, so only those statements see the new name.
    fn visit_block(&mut self, mut node: AstNode, enclosing: Option<&str>) -> Result<AstNode, DesugarError> {
        let AstNodeKind::Block { statements } = &mut node.kind else {
            return Err(DesugarError::internal("expected a block"));
        };
        for i in 0..statements.len() {
            if let AstNodeKind::LocalClassDecl { class } = &statements[i].kind {
                let simple = class.kind.class_name().unwrap_or_default().to_string();
                let outer = enclosing.ok_or_else(|| DesugarError::internal("local class outside of a class"))?;
                let binary = self.fresh_name(outer, &simple);
                trace!("local class {} -> {}", simple, binary);
                self.local_classes.insert(binary.clone());
                let renames = HashMap::from([(simple, binary)]);
                for stmt in &mut statements[i..] {
                    *stmt = rename_classes(take(stmt), &renames);
                }
            }
            let stmt = take(&mut statements[i]);
            statements[i] = self.visit(stmt, enclosing)?;
        }
        Ok(node)
    }

    fn name_anonymous(&mut self, node: AstNode, enclosing: Option<&str>) -> Result<AstNode, DesugarError> {
        let location = node.location.clone();
        let ty = node.ty.clone();
        let AstNodeKind::New { class, ctor_params, args, body: Some(body) } = node.kind else {
            return Err(DesugarError::internal("anonymous class without a body"));
        };
        let args = args
            .into_iter()
            .map(|a| self.visit(a, enclosing))
            .collect::<Result<Vec<_>, _>>()?;

        let outer = enclosing.ok_or_else(|| DesugarError::internal("anonymous class outside of a class"))?;
        let binary = self.fresh_name(outer, "");
        let is_interface = self.is_interface(&class).map_err(|e| e.at(location.as_ref()))?;
        trace!("anonymous {} class -> {}", class, binary);

        let mut body = rename_classes(*body, &HashMap::from([(String::new(), binary.clone())]));
        if let AstNodeKind::ClassDecl { superclass, interfaces, .. } = &mut body.kind {
            if is_interface {
                *superclass = Some(OBJECT_CLASS.to_string());
                *interfaces = vec![class];
            } else {
                *superclass = Some(class);
                interfaces.clear();
            }
        }
        let body = self.visit(body, Some(binary.as_str()))?;

        let mut named = AstNode::new(
            AstNodeKind::New { class: binary, ctor_params, args, body: Some(Box::new(body)) },
            location,
        );
        named.ty = ty;
        Ok(named)
    }
}
