//    This file is part of doctree.
//
//    doctree is free software: you can redistribute it and/or modify
//    it under the terms of the GNU General Public License as published by
//    the Free Software Foundation, either version 3 of the License, or
//    (at your option) any later version.
//
//    doctree is distributed in the hope that it will be useful,
//    but WITHOUT ANY WARRANTY; without even the implied warranty of
//    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//    GNU General Public License for more details.
//
//    You should have received a copy of the GNU General Public License
//    along with doctree.  If not, see <https://www.gnu.org/licenses/>.

//! Arena-based parse tree.
//!
//! The original `Rc<RefCell<Weak<..>>>` graph makes the synchronizer's
//! "detach this subtree, re-parent that one, keep walking" edits a minefield
//! of runtime borrow panics. An arena sidesteps it: nodes live in one
//! `Vec`, are addressed by a generational index, and mutation is a `&mut
//! Tree` method rather than an interior-mutability dance. A stale `NodeId`
//! (kept past a `detach`) is caught at the generation check instead of
//! aliasing a freed slot.

use crate::affiliated::Affiliated;
use crate::kind::Kind;
use std::fmt;

/// Generational handle into a [`Tree`]. Two `NodeId`s with the same `index`
/// but different `generation` never alias: the earlier one was freed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeId({}#{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Interval {
        Interval { start, end }
    }
}

/// Per-kind payload. Large variants are boxed so the enum stays small on
/// the common path (plain text, paragraphs, table rows).
#[derive(Debug)]
pub enum NodeData<'a> {
    Document,

    BabelCall(Box<crate::babel::BabelCallData<'a>>),
    CenterBlock,
    Clock(Box<crate::planning::ClockData<'a>>),
    Comment(Box<crate::markup::CommentData<'a>>),
    CommentBlock(Box<crate::blocks::CommentBlockData<'a>>),
    DiarySexp(Box<crate::planning::DiarySexpData<'a>>),
    Drawer(Box<crate::drawer::DrawerData<'a>>),
    DynamicBlock(Box<crate::blocks::DynamicBlockData<'a>>),
    ExampleBlock(Box<crate::blocks::ExampleBlockData<'a>>),
    ExportBlock(Box<crate::blocks::ExportBlockData<'a>>),
    FixedWidth(Box<crate::fixed_width::FixedWidthData<'a>>),
    FootnoteDefinition(Box<crate::footnote_definition::FootnoteDefinitionData<'a>>),
    Headline(Box<crate::headline::HeadlineData<'a>>),
    HorizontalRule,
    InlineTask(Box<crate::headline::InlineTaskData<'a>>),
    Item(Box<crate::list::ItemData<'a>>),
    Keyword(Box<crate::keyword::KeywordData<'a>>),
    LatexEnvironment(Box<crate::latex::LatexEnvironmentData<'a>>),
    NodeProperty(Box<crate::headline::NodePropertyData<'a>>),
    Paragraph,
    PlainList(Box<crate::list::PlainListData>),
    Planning(Box<crate::planning::PlanningData<'a>>),
    PropertyDrawer,
    QuoteBlock,
    Section,
    SpecialBlock(Box<crate::blocks::SpecialBlockData<'a>>),
    SrcBlock(Box<crate::blocks::SrcBlockData<'a>>),
    Table(Box<crate::table::TableData<'a>>),
    TableRow(Box<crate::table::TableRowData<'a>>),
    VerseBlock,

    Bold,
    Code(Box<crate::objects::CodeData<'a>>),
    Entity(Box<crate::objects::EntityData<'a>>),
    ExportSnippet(Box<crate::objects::ExportSnippetData<'a>>),
    FootnoteReference(Box<crate::objects::FootnoteReferenceData<'a>>),
    InlineBabelCall(Box<crate::objects::InlineBabelCallData<'a>>),
    InlineSrcBlock(Box<crate::objects::InlineSrcBlockData<'a>>),
    Italic,
    LineBreak,
    LatexFragment(Box<crate::latex::LatexFragmentData<'a>>),
    Link(Box<crate::objects::LinkData<'a>>),
    Macro(Box<crate::objects::MacroData<'a>>),
    RadioTarget(Box<crate::objects::RadioTargetData<'a>>),
    StatisticsCookie(Box<crate::objects::StatisticsCookieData<'a>>),
    StrikeThrough,
    Subscript(Box<crate::objects::SubscriptData>),
    Superscript(Box<crate::objects::SuperscriptData>),
    TableCell,
    Target(Box<crate::objects::TargetData<'a>>),
    Timestamp(Box<crate::objects::TimestampData<'a>>),
    Underline,
    Verbatim(Box<crate::objects::VerbatimData<'a>>),

    PlainText(&'a str),
}

impl<'a> NodeData<'a> {
    pub fn kind(&self) -> Kind {
        use NodeData::*;
        match self {
            Document => Kind::Document,
            BabelCall(..) => Kind::BabelCall,
            CenterBlock => Kind::CenterBlock,
            Clock(..) => Kind::Clock,
            Comment(..) => Kind::Comment,
            CommentBlock(..) => Kind::CommentBlock,
            DiarySexp(..) => Kind::DiarySexp,
            Drawer(..) => Kind::Drawer,
            DynamicBlock(..) => Kind::DynamicBlock,
            ExampleBlock(..) => Kind::ExampleBlock,
            ExportBlock(..) => Kind::ExportBlock,
            FixedWidth(..) => Kind::FixedWidth,
            FootnoteDefinition(..) => Kind::FootnoteDefinition,
            Headline(..) => Kind::Headline,
            HorizontalRule => Kind::HorizontalRule,
            InlineTask(..) => Kind::InlineTask,
            Item(..) => Kind::Item,
            Keyword(..) => Kind::Keyword,
            LatexEnvironment(..) => Kind::LatexEnvironment,
            NodeProperty(..) => Kind::NodeProperty,
            Paragraph => Kind::Paragraph,
            PlainList(..) => Kind::PlainList,
            Planning(..) => Kind::Planning,
            PropertyDrawer => Kind::PropertyDrawer,
            QuoteBlock => Kind::QuoteBlock,
            Section => Kind::Section,
            SpecialBlock(..) => Kind::SpecialBlock,
            SrcBlock(..) => Kind::SrcBlock,
            Table(..) => Kind::Table,
            TableRow(..) => Kind::TableRow,
            VerseBlock => Kind::VerseBlock,
            Bold => Kind::Bold,
            Code(..) => Kind::Code,
            Entity(..) => Kind::Entity,
            ExportSnippet(..) => Kind::ExportSnippet,
            FootnoteReference(..) => Kind::FootnoteReference,
            InlineBabelCall(..) => Kind::InlineBabelCall,
            InlineSrcBlock(..) => Kind::InlineSrcBlock,
            Italic => Kind::Italic,
            LineBreak => Kind::LineBreak,
            LatexFragment(..) => Kind::LatexFragment,
            Link(..) => Kind::Link,
            Macro(..) => Kind::Macro,
            RadioTarget(..) => Kind::RadioTarget,
            StatisticsCookie(..) => Kind::StatisticsCookie,
            StrikeThrough => Kind::StrikeThrough,
            Subscript(..) => Kind::Subscript,
            Superscript(..) => Kind::Superscript,
            TableCell => Kind::TableCell,
            Target(..) => Kind::Target,
            Timestamp(..) => Kind::Timestamp,
            Underline => Kind::Underline,
            Verbatim(..) => Kind::Verbatim,
            PlainText(..) => Kind::PlainText,
        }
    }
}

/// One arena slot's live payload.
#[derive(Debug)]
pub struct NodeSlot<'a> {
    pub data: NodeData<'a>,

    /// `begin`/`end` of the whole node, including trailing blank lines.
    pub location: Interval,
    /// `contents-begin`/`contents-end`, absent for childless elements.
    pub content_location: Option<Interval>,
    /// Blank lines (or, for objects, whitespace) absorbed at the node's end.
    pub post_blank: usize,
    pub affiliated: Vec<Affiliated>,

    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A slot is either occupied or, once freed, a tombstone recording the
/// generation the next occupant at this index must carry.
enum Slot<'a> {
    Occupied(u32, NodeSlot<'a>),
    Free(u32),
}

/// Owns every node of one parse. Addressed exclusively through [`NodeId`];
/// there is no way to hold a raw reference across a mutation.
pub struct Tree<'a> {
    slots: Vec<Slot<'a>>,
    free: Vec<u32>,
    root: NodeId,
}

impl<'a> Tree<'a> {
    pub fn new() -> Tree<'a> {
        let root_slot = NodeSlot {
            data: NodeData::Document,
            location: Interval::new(0, 0),
            content_location: None,
            post_blank: 0,
            affiliated: Vec::new(),
            parent: None,
            children: Vec::new(),
        };
        Tree {
            slots: vec![Slot::Occupied(0, root_slot)],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Inserts a detached node (no parent, no children) and returns its id.
    /// Callers attach it with [`crate::tree::adopt`].
    pub fn insert(
        &mut self,
        data: NodeData<'a>,
        location: Interval,
        content_location: Option<Interval>,
        post_blank: usize,
        affiliated: Vec<Affiliated>,
    ) -> NodeId {
        let slot = NodeSlot {
            data,
            location,
            content_location,
            post_blank,
            affiliated,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let generation = match self.slots[index as usize] {
                Slot::Free(g) => g,
                Slot::Occupied(..) => unreachable!("free list pointed at an occupied slot"),
            };
            self.slots[index as usize] = Slot::Occupied(generation, slot);
            NodeId { index, generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied(0, slot));
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeSlot<'a>> {
        match self.slots.get(id.index as usize) {
            Some(Slot::Occupied(g, slot)) if *g == id.generation => Some(slot),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeSlot<'a>> {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot::Occupied(g, slot)) if *g == id.generation => Some(slot),
            _ => None,
        }
    }

    pub fn kind_of(&self, id: NodeId) -> Option<Kind> {
        self.get(id).map(|n| n.data.kind())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Removes a node's slot entirely, bumping its generation so any
    /// lingering `NodeId` into it is caught by `get`/`get_mut` as stale.
    /// Does not touch the parent's child list or the node's own children —
    /// callers go through `crate::tree::extract` for a structural removal.
    pub(crate) fn free_slot(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if matches!(slot, Slot::Occupied(g, _) if *g == id.generation) {
                *slot = Slot::Free(id.generation.wrapping_add(1));
                self.free.push(id.index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(..)))
            .count()
    }
}

impl<'a> Default for Tree<'a> {
    fn default() -> Self {
        Tree::new()
    }
}
