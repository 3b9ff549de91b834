//! # Schema Tree Builder
//!
//! Compiles module fragments into a [`SchemaTree`] in four phases:
//!
//! 1. **Compile.** Register every module's typedefs and groupings, then
//!    compile each module's body in the order the fragments were given.
//!    Typedef chains are resolved with cycle detection, `uses` statements
//!    are expanded inline, and defaults are checked against their types.
//! 2. **Deviate.** Apply every `deviate replace` in fragment order. Later
//!    deviations of the same facet overwrite earlier ones.
//! 3. **Augment.** Graft augmentation children onto their targets. Targets
//!    resolve against the tree as deviated, and against nodes added by
//!    earlier augmentations.
//! 4. **Finalize.** Build the path indices and freeze the tree.
//!
//! Any error aborts the build; no partial tree is ever returned.

use std::collections::HashMap;

use ydm_core::{is_identifier, BuildError, PathError, QualifiedName, SchemaPath, TargetPath, Value};

use crate::node::{NodeId, NodeKind, SchemaNode};
use crate::statement::{
    AugmentStmt, DeviationStmt, GroupingStmt, ModuleFragment, NodeStmt, TypeStmt, TypedefStmt,
};
use crate::tree::{ModuleInfo, SchemaTree};
use crate::types::{BaseType, TypeSpec};

/// Build a schema tree from base modules, deviation modules and
/// augmentation modules.
///
/// Deviations always apply before augmentations, whatever module carries
/// them, so an augmentation target is resolved against the deviated tree.
pub fn build(
    base: &[ModuleFragment],
    deviations: &[ModuleFragment],
    augmentations: &[ModuleFragment],
) -> Result<SchemaTree, BuildError> {
    base.iter()
        .chain(deviations)
        .chain(augmentations)
        .fold(SchemaBuilder::new(), |b, m| b.module(m.clone()))
        .build()
}

/// Collects module fragments and compiles them into a [`SchemaTree`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    modules: Vec<ModuleFragment>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: ModuleFragment) -> Self {
        self.modules.push(module);
        self
    }

    pub fn add_module(&mut self, module: ModuleFragment) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[ModuleFragment] {
        &self.modules
    }

    /// Run all build phases.
    pub fn build(&self) -> Result<SchemaTree, BuildError> {
        let mut compiler = Compiler::new(&self.modules)?;

        for module in &self.modules {
            compiler.compile_body(module)?;
        }
        tracing::debug!(
            modules = self.modules.len(),
            nodes = compiler.tree.len(),
            "compiled module bodies"
        );

        for module in &self.modules {
            for deviation in &module.deviations {
                compiler.apply_deviation(module, deviation)?;
            }
        }

        for module in &self.modules {
            for augment in &module.augments {
                compiler.apply_augment(module, augment)?;
            }
        }

        let tree = compiler.tree.finalize();
        tracing::info!(
            modules = self.modules.len(),
            nodes = tree.len(),
            "schema tree built"
        );
        Ok(tree)
    }
}

/// Name resolution context of one module.
#[derive(Debug, Clone)]
struct Scope {
    module: String,
    prefix: String,
    imports: HashMap<String, String>,
}

impl Scope {
    fn new(fragment: &ModuleFragment) -> Self {
        Self {
            module: fragment.name.clone(),
            prefix: fragment.prefix.clone(),
            imports: fragment
                .imports
                .iter()
                .map(|i| (i.prefix.clone(), i.module.clone()))
                .collect(),
        }
    }

    /// Module a (possibly absent) prefix refers to.
    fn resolve(&self, prefix: Option<&str>) -> Result<&str, BuildError> {
        match prefix {
            None => Ok(&self.module),
            Some(p) if p == self.prefix => Ok(&self.module),
            Some(p) => self
                .imports
                .get(p)
                .map(String::as_str)
                .ok_or_else(|| BuildError::UnknownPrefix {
                    module: self.module.clone(),
                    prefix: p.to_string(),
                }),
        }
    }
}

type DefKey = (String, String);

struct Compiler<'m> {
    scopes: HashMap<String, Scope>,
    typedefs: HashMap<DefKey, &'m TypedefStmt>,
    groupings: HashMap<DefKey, &'m GroupingStmt>,
    compiled: HashMap<DefKey, TypeSpec>,
    resolving: Vec<DefKey>,
    expanding: Vec<DefKey>,
    tree: SchemaTree,
}

impl<'m> Compiler<'m> {
    fn new(modules: &'m [ModuleFragment]) -> Result<Self, BuildError> {
        let mut compiler = Self {
            scopes: HashMap::new(),
            typedefs: HashMap::new(),
            groupings: HashMap::new(),
            compiled: HashMap::new(),
            resolving: Vec::new(),
            expanding: Vec::new(),
            tree: SchemaTree::default(),
        };
        for m in modules {
            if !is_identifier(&m.name) {
                return Err(PathError::InvalidIdentifier(m.name.clone()).into());
            }
            if compiler.scopes.contains_key(&m.name) {
                return Err(BuildError::DuplicateModule(m.name.clone()));
            }
            compiler.scopes.insert(m.name.clone(), Scope::new(m));
            compiler.tree.add_module(ModuleInfo {
                name: m.name.clone(),
                prefix: m.prefix.clone(),
                namespace: m.namespace.clone(),
                revision: m.revision.clone(),
            });
            for t in &m.typedefs {
                let key = (m.name.clone(), t.name.clone());
                if compiler.typedefs.insert(key, t).is_some() {
                    return Err(BuildError::DuplicateNode {
                        parent: format!("typedefs of module '{}'", m.name),
                        name: t.name.clone(),
                    });
                }
            }
            for g in &m.groupings {
                let key = (m.name.clone(), g.name.clone());
                if compiler.groupings.insert(key, g).is_some() {
                    return Err(BuildError::DuplicateNode {
                        parent: format!("groupings of module '{}'", m.name),
                        name: g.name.clone(),
                    });
                }
            }
        }
        Ok(compiler)
    }

    fn scope(&self, module: &str) -> Result<Scope, BuildError> {
        self.scopes
            .get(module)
            .cloned()
            .ok_or_else(|| BuildError::Load(format!("module '{module}' is not loaded")))
    }

    // ── Phase 1: bodies ─────────────────────────────────────────────────

    fn compile_body(&mut self, module: &'m ModuleFragment) -> Result<(), BuildError> {
        let scope = self.scope(&module.name)?;
        // Unused typedefs are still checked.
        for t in &module.typedefs {
            self.typedef(&module.name, &t.name, &format!("module {}", module.name))?;
        }
        for stmt in &module.body {
            self.compile_node(&scope, &module.name, None, stmt)?;
        }
        tracing::debug!(module = %module.name, "compiled module body");
        Ok(())
    }

    fn compile_node(
        &mut self,
        scope: &Scope,
        owner: &str,
        parent: Option<NodeId>,
        stmt: &'m NodeStmt,
    ) -> Result<(), BuildError> {
        match stmt {
            NodeStmt::Container(c) => {
                let id = self.add_node(parent, &c.name, NodeKind::Container, owner)?;
                self.tree.get_mut(id).description = c.description.clone();
                for child in &c.children {
                    self.compile_node(scope, owner, Some(id), child)?;
                }
            }
            NodeStmt::Leaf(l) => {
                let at = self.path_of(parent, &l.name);
                let spec = self.compile_type(scope, &l.type_, &at)?;
                if l.mandatory && l.default.is_some() {
                    return Err(BuildError::InvalidDefault {
                        path: at,
                        reason: "a mandatory leaf cannot have a default".into(),
                    });
                }
                let default = match l.default.as_deref().or(spec.default_literal()) {
                    Some(lit) if !l.mandatory => Some(compile_default(&spec, lit, &at)?),
                    _ => None,
                };
                let id = self.add_node(parent, &l.name, NodeKind::Leaf, owner)?;
                let node = self.tree.get_mut(id);
                node.type_spec = Some(spec);
                node.default = default;
                node.mandatory = l.mandatory;
                node.description = l.description.clone();
            }
            NodeStmt::LeafList(l) => {
                let at = self.path_of(parent, &l.name);
                let spec = self.compile_type(scope, &l.type_, &at)?;
                let id = self.add_node(parent, &l.name, NodeKind::LeafList, owner)?;
                let node = self.tree.get_mut(id);
                node.type_spec = Some(spec);
                node.description = l.description.clone();
            }
            NodeStmt::List(l) => {
                let id = self.add_node(parent, &l.name, NodeKind::List, owner)?;
                self.tree.get_mut(id).description = l.description.clone();
                for child in &l.children {
                    self.compile_node(scope, owner, Some(id), child)?;
                }
                let key = self.check_key(id, &l.key)?;
                self.tree.get_mut(id).key = Some(key);
            }
            NodeStmt::Choice(c) => {
                let id = self.add_node(parent, &c.name, NodeKind::Choice, owner)?;
                let node = self.tree.get_mut(id);
                node.mandatory = c.mandatory;
                node.description = c.description.clone();
                for case in &c.cases {
                    let case_id = self.add_node(Some(id), &case.name, NodeKind::Case, owner)?;
                    for child in &case.children {
                        self.compile_node(scope, owner, Some(case_id), child)?;
                    }
                }
            }
            NodeStmt::Uses(u) => self.expand_uses(scope, owner, parent, &u.grouping)?,
        }
        Ok(())
    }

    /// Expand a grouping in place. Type references inside the grouping
    /// resolve in the grouping's own module; the nodes belong to `owner`.
    fn expand_uses(
        &mut self,
        scope: &Scope,
        owner: &str,
        parent: Option<NodeId>,
        name: &str,
    ) -> Result<(), BuildError> {
        let at = self.parent_path(parent).to_string();
        let qn = QualifiedName::parse(name)?;
        let module = scope.resolve(qn.prefix.as_deref())?.to_string();
        let key = (module.clone(), qn.name.clone());
        let grouping = self
            .groupings
            .get(&key)
            .copied()
            .ok_or_else(|| BuildError::UnknownGrouping {
                path: at.clone(),
                name: name.to_string(),
            })?;
        if self.expanding.contains(&key) {
            return Err(BuildError::DefinitionCycle {
                path: at,
                name: name.to_string(),
            });
        }
        let grouping_scope = self.scope(&module)?;
        self.expanding.push(key);
        let result = grouping
            .children
            .iter()
            .try_for_each(|child| self.compile_node(&grouping_scope, owner, parent, child));
        self.expanding.pop();
        result
    }

    fn check_key(&self, list: NodeId, key: &str) -> Result<String, BuildError> {
        let node = self.tree.get(list);
        let invalid = |reason: String| BuildError::InvalidKey {
            path: node.path.to_string(),
            reason,
        };
        let mut names = key.split_whitespace();
        let Some(name) = names.next() else {
            return Err(invalid("list declares no key".into()));
        };
        if names.next().is_some() {
            return Err(invalid(format!("composite key '{key}' is not supported")));
        }
        let leaf = node
            .children
            .iter()
            .map(|id| self.tree.get(*id))
            .find(|c| c.name == name)
            .ok_or_else(|| invalid(format!("'{name}' is not a child of the list")))?;
        if leaf.kind != NodeKind::Leaf {
            return Err(invalid(format!("'{name}' is a {}, not a leaf", leaf.kind)));
        }
        Ok(name.to_string())
    }

    fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        owner: &str,
    ) -> Result<NodeId, BuildError> {
        if !is_identifier(name) {
            return Err(PathError::InvalidIdentifier(name.to_string()).into());
        }
        if self.tree.name_taken(parent, name) {
            return Err(BuildError::DuplicateNode {
                parent: self.parent_path(parent).to_string(),
                name: name.to_string(),
            });
        }
        let (path, data_base) = match parent {
            Some(p) => {
                let p = self.tree.get(p);
                (p.path.child(name), p.data_path.clone())
            }
            None => (SchemaPath::root().child(name), SchemaPath::root()),
        };
        let data_path = if kind.is_data() {
            data_base.child(name)
        } else {
            data_base
        };
        Ok(self.tree.push(SchemaNode {
            id: NodeId(0),
            name: name.to_string(),
            module: owner.to_string(),
            kind,
            path,
            data_path,
            parent,
            children: Vec::new(),
            type_spec: None,
            default: None,
            mandatory: false,
            key: None,
            description: None,
        }))
    }

    fn parent_path(&self, parent: Option<NodeId>) -> SchemaPath {
        parent.map_or_else(SchemaPath::root, |p| self.tree.get(p).path.clone())
    }

    fn path_of(&self, parent: Option<NodeId>, name: &str) -> String {
        self.parent_path(parent).child(name).to_string()
    }

    // ── Types ───────────────────────────────────────────────────────────

    fn compile_type(
        &mut self,
        scope: &Scope,
        stmt: &TypeStmt,
        at: &str,
    ) -> Result<TypeSpec, BuildError> {
        let unknown = || BuildError::UnknownType {
            path: at.to_string(),
            name: stmt.name.clone(),
        };
        let qn = QualifiedName::parse(&stmt.name).map_err(|_| unknown())?;
        let parent = match (&qn.prefix, BaseType::from_keyword(&qn.name)) {
            (None, Some(base)) => TypeSpec::builtin(base),
            _ => {
                let module = scope.resolve(qn.prefix.as_deref())?.to_string();
                self.typedef(&module, &qn.name, at)?
            }
        };
        let mut members = Vec::with_capacity(stmt.types.len());
        for member in &stmt.types {
            members.push(self.compile_type(scope, member, at)?);
        }
        parent.restrict(stmt, members, at)
    }

    fn typedef(&mut self, module: &str, name: &str, at: &str) -> Result<TypeSpec, BuildError> {
        let key = (module.to_string(), name.to_string());
        if let Some(spec) = self.compiled.get(&key) {
            return Ok(spec.clone());
        }
        let def = self
            .typedefs
            .get(&key)
            .copied()
            .ok_or_else(|| BuildError::UnknownType {
                path: at.to_string(),
                name: name.to_string(),
            })?;
        if self.resolving.contains(&key) {
            return Err(BuildError::DefinitionCycle {
                path: at.to_string(),
                name: name.to_string(),
            });
        }
        let scope = self.scope(module)?;
        let here = format!("typedef {module}:{name}");
        self.resolving.push(key.clone());
        let result = self.compile_type(&scope, &def.type_, &here);
        self.resolving.pop();

        let spec = result?.with_name(name);
        let literal = def
            .default
            .clone()
            .or_else(|| spec.default_literal().map(str::to_string));
        if let Some(lit) = &literal {
            compile_default(&spec, lit, &here)?;
        }
        let spec = spec.with_default(literal);
        tracing::trace!(typedef = %here, base = %spec.base(), "resolved typedef");
        self.compiled.insert(key, spec.clone());
        Ok(spec)
    }

    // ── Phase 2: deviations ─────────────────────────────────────────────

    fn apply_deviation(
        &mut self,
        module: &ModuleFragment,
        stmt: &DeviationStmt,
    ) -> Result<(), BuildError> {
        let scope = self.scope(&module.name)?;
        let origin = format!("deviation in module '{}'", module.name);
        let id = self.resolve_target(&scope, &origin, &stmt.target)?;

        let node = self.tree.get(id);
        if !matches!(node.kind, NodeKind::Leaf | NodeKind::LeafList) {
            return Err(BuildError::InvalidTarget {
                origin,
                target: stmt.target.clone(),
                reason: format!("a {} cannot be deviated, only leaf and leaf-list nodes", node.kind),
            });
        }
        if stmt.replace.is_empty() {
            return Err(BuildError::InvalidDeviation {
                origin,
                target: stmt.target.clone(),
            });
        }
        let at = node.path.to_string();
        let kind = node.kind;
        let old_type = node.type_spec.clone();
        let old_default = node.default.clone();
        let mandatory = stmt.replace.mandatory.unwrap_or(node.mandatory);

        if kind == NodeKind::LeafList && stmt.replace.default.is_some() {
            return Err(BuildError::InvalidDefault {
                path: at,
                reason: "leaf-list defaults are not supported".into(),
            });
        }

        let spec = match (&stmt.replace.type_, old_type) {
            (Some(t), _) => self.compile_type(&scope, t, &at)?,
            (None, Some(spec)) => spec,
            (None, None) => {
                return Err(BuildError::InvalidTarget {
                    origin,
                    target: stmt.target.clone(),
                    reason: "node has no type".into(),
                })
            }
        };

        let default = match (&stmt.replace.default, &old_default) {
            (Some(lit), _) => Some(compile_default(&spec, lit, &at)?),
            (None, Some(old)) => Some(recheck_default(&spec, old, &at)?),
            (None, None) => None,
        };
        if mandatory && default.is_some() {
            return Err(BuildError::InvalidDefault {
                path: at,
                reason: "a mandatory leaf cannot have a default".into(),
            });
        }

        let node = self.tree.get_mut(id);
        node.type_spec = Some(spec);
        node.default = default;
        node.mandatory = mandatory;
        tracing::debug!(node = %at, module = %module.name, "applied deviation");
        Ok(())
    }

    // ── Phase 3: augmentations ──────────────────────────────────────────

    fn apply_augment(
        &mut self,
        module: &'m ModuleFragment,
        stmt: &'m AugmentStmt,
    ) -> Result<(), BuildError> {
        let scope = self.scope(&module.name)?;
        let origin = format!("augmentation in module '{}'", module.name);
        let id = self.resolve_target(&scope, &origin, &stmt.target)?;

        let target = self.tree.get(id);
        if !matches!(target.kind, NodeKind::Container | NodeKind::List | NodeKind::Case) {
            return Err(BuildError::InvalidTarget {
                origin,
                target: stmt.target.clone(),
                reason: format!("a {} cannot be augmented", target.kind),
            });
        }
        let target_path = target.path.to_string();
        let target_scope = target.data_path.clone();

        for child in &stmt.children {
            if let Err(e) = self.compile_node(&scope, &module.name, Some(id), child) {
                return Err(match e {
                    BuildError::DuplicateNode { parent, name }
                        if self.shares_data_scope(&parent, &target_scope) =>
                    {
                        BuildError::DuplicateChild {
                            module: module.name.clone(),
                            target: target_path.clone(),
                            child: name,
                        }
                    }
                    other => other,
                });
            }
        }
        tracing::debug!(
            node = %target_path,
            module = %module.name,
            children = stmt.children.len(),
            "applied augmentation"
        );
        Ok(())
    }

    /// True if children of the node at schema path `parent` land in the
    /// data namespace `scope`. Choice and case levels are transparent.
    fn shares_data_scope(&self, parent: &str, scope: &SchemaPath) -> bool {
        SchemaPath::parse(parent)
            .ok()
            .and_then(|p| self.tree.find_schema(&p))
            .is_some_and(|node| node.data_path == *scope)
    }

    fn resolve_target(
        &self,
        scope: &Scope,
        origin: &str,
        target: &str,
    ) -> Result<NodeId, BuildError> {
        let path = TargetPath::parse(target)?;
        for seg in path.segments() {
            scope.resolve(seg.prefix.as_deref())?;
        }
        self.tree
            .locate(&path)
            .ok_or_else(|| BuildError::UnknownTarget {
                origin: origin.to_string(),
                target: target.to_string(),
            })
    }
}

/// Parse a default literal and check it against its type.
fn compile_default(spec: &TypeSpec, literal: &str, at: &str) -> Result<Value, BuildError> {
    let value = spec
        .parse_literal(literal)
        .ok_or_else(|| BuildError::InvalidDefault {
            path: at.to_string(),
            reason: format!("\"{literal}\" is not a valid {}", spec.describe()),
        })?;
    check_default(spec, value, at)
}

/// Carry an existing default over to a replaced type.
fn recheck_default(spec: &TypeSpec, old: &Value, at: &str) -> Result<Value, BuildError> {
    let value = spec
        .coerce(old)
        .or_else(|| spec.parse_literal(&old.to_string()))
        .ok_or_else(|| BuildError::InvalidDefault {
            path: at.to_string(),
            reason: format!("existing default \"{old}\" is not a valid {}", spec.describe()),
        })?;
    check_default(spec, value, at)
}

fn check_default(spec: &TypeSpec, value: Value, at: &str) -> Result<Value, BuildError> {
    let failures = spec.check(&value);
    if failures.is_empty() {
        return Ok(value);
    }
    let reasons: Vec<String> = failures.into_iter().map(|v| v.reason).collect();
    Err(BuildError::InvalidDefault {
        path: at.to_string(),
        reason: reasons.join("; "),
    })
}
