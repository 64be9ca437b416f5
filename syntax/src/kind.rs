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

//! The grammar's kind lattice: every element and object type the parser can
//! produce, and the `can_contain` restriction table that governs which
//! object kinds are admissible inside which container.
//!
//! https://orgmode.org/worg/dev/org-element-api.html

/// Discriminant for every node the tree can hold. Carries no payload —
/// the payload lives alongside it in `NodeData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Root of the parse tree.
    Document,

    BabelCall,
    CenterBlock,
    Clock,
    Comment,
    CommentBlock,
    DiarySexp,
    Drawer,
    DynamicBlock,
    ExampleBlock,
    ExportBlock,
    FixedWidth,
    FootnoteDefinition,
    Headline,
    HorizontalRule,
    InlineTask,
    Item,
    Keyword,
    LatexEnvironment,
    NodeProperty,
    Paragraph,
    PlainList,
    Planning,
    PropertyDrawer,
    QuoteBlock,
    Section,
    SpecialBlock,
    SrcBlock,
    Table,
    TableRow,
    VerseBlock,

    Bold,
    Code,
    Entity,
    ExportSnippet,
    FootnoteReference,
    InlineBabelCall,
    InlineSrcBlock,
    Italic,
    LineBreak,
    LatexFragment,
    Link,
    Macro,
    RadioTarget,
    StatisticsCookie,
    StrikeThrough,
    Subscript,
    Superscript,
    TableCell,
    Target,
    Timestamp,
    Underline,
    Verbatim,

    /// Special object: a run of un-marked-up text.
    PlainText,
}

impl Kind {
    #[rustfmt::skip]
    pub fn is_greater_element(self) -> bool {
        use Kind::*;
        matches!(
            self,
            CenterBlock | Drawer | DynamicBlock | FootnoteDefinition | Headline | InlineTask
                | Item | PlainList | PropertyDrawer | QuoteBlock | Section | SpecialBlock | Table
        )
    }

    #[rustfmt::skip]
    pub fn is_element(self) -> bool {
        use Kind::*;
        matches!(
            self,
            BabelCall | CenterBlock | Clock | Comment | CommentBlock | DiarySexp | Drawer
                | DynamicBlock | ExampleBlock | ExportBlock | FixedWidth | FootnoteDefinition
                | Headline | HorizontalRule | InlineTask | Item | Keyword | LatexEnvironment
                | NodeProperty | Paragraph | PlainList | Planning | PropertyDrawer | QuoteBlock
                | Section | SpecialBlock | SrcBlock | Table | TableRow | VerseBlock
        )
    }

    #[rustfmt::skip]
    pub fn is_object(self) -> bool {
        use Kind::*;
        matches!(
            self,
            Bold | Code | Entity | ExportSnippet | FootnoteReference | InlineBabelCall
                | InlineSrcBlock | Italic | LineBreak | LatexFragment | Link | Macro
                | RadioTarget | StatisticsCookie | StrikeThrough | Subscript | Superscript
                | TableCell | Target | Timestamp | Underline | Verbatim | PlainText
        )
    }

    #[rustfmt::skip]
    pub fn is_recursive_object(self) -> bool {
        use Kind::*;
        matches!(
            self,
            Bold | FootnoteReference | Italic | Link | RadioTarget | StrikeThrough | Subscript
                | Superscript | TableCell | Underline
        )
    }

    #[rustfmt::skip]
    pub fn is_object_container(self) -> bool {
        use Kind::*;
        matches!(
            self,
            Paragraph | TableRow | VerseBlock | Bold | FootnoteReference | Italic | Link
                | RadioTarget | StrikeThrough | Subscript | Superscript | TableCell | Underline
        )
    }

    pub fn is_container(self) -> bool {
        self.is_greater_element() || self.is_object_container()
    }

    /// Mirrors `org-element-object-restrictions`: which object kinds may
    /// appear inside a container of kind `self`. Applies both to a node's
    /// direct contents and to the secondary strings computed off it (a
    /// `Headline` never directly holds objects, but its title does, hence
    /// the entry here).
    pub fn can_contain(self, that: Kind) -> bool {
        fn is_from_standard_set(that: Kind) -> bool {
            match that {
                Kind::TableCell => false,
                x if x.is_object() => true,
                _ => false,
            }
        }

        fn is_from_standard_set_no_line_break(that: Kind) -> bool {
            match that {
                Kind::LineBreak => false,
                x => is_from_standard_set(x),
            }
        }

        use Kind::*;
        match self {
            Bold | Italic | FootnoteReference | Paragraph | StrikeThrough | Subscript
            | Superscript | Underline | VerseBlock => is_from_standard_set(that),

            Headline | InlineTask | Item => is_from_standard_set_no_line_break(that),

            Keyword => match that {
                FootnoteReference => false,
                x => is_from_standard_set(x),
            },

            // Ignore all links in a link description. Also ignore
            // radio-targets and line breaks.
            Link => matches!(
                that,
                Bold | Code | Entity | ExportSnippet | InlineBabelCall | InlineSrcBlock | Italic
                    | LatexFragment | Macro | StatisticsCookie | StrikeThrough | Subscript
                    | Superscript | Underline | Verbatim
            ),

            // Remove any variable object from radio target as it would
            // prevent it from being properly recognized.
            RadioTarget => matches!(
                that,
                Bold | Code | Entity | Italic | LatexFragment | StrikeThrough | Subscript
                    | Superscript | Underline
            ),

            // Ignore inline babel call and inline source block as formulas
            // are possible. Also ignore line breaks and statistics cookies.
            TableCell => matches!(
                that,
                Bold | Code | Entity | ExportSnippet | FootnoteReference | Italic
                    | LatexFragment | Link | Macro | RadioTarget | StrikeThrough | Subscript
                    | Superscript | Target | Timestamp | Underline | Verbatim
            ),

            TableRow => matches!(that, TableCell),

            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Kind;

    #[test]
    fn can_contain() {
        let bold = Kind::Bold;
        let br = Kind::LineBreak;
        let verse = Kind::VerseBlock;

        fn closure_test(that: Kind, restriction: impl Fn(Kind) -> bool) -> bool {
            restriction(that)
        }

        assert!(!bold.can_contain(Kind::VerseBlock));
        assert!(bold.can_contain(Kind::LineBreak));
        assert!(closure_test(br, |that| bold.can_contain(that)));
        assert!(!closure_test(verse, |that| bold.can_contain(that)));
    }

    #[test]
    fn table_row_only_contains_table_cell() {
        assert!(Kind::TableRow.can_contain(Kind::TableCell));
        assert!(!Kind::TableRow.can_contain(Kind::Bold));
    }

    #[test]
    fn greater_element_element_object_are_disjoint_from_each_other_by_tag() {
        for k in [Kind::Headline, Kind::Item, Kind::Table] {
            assert!(k.is_greater_element());
            assert!(k.is_element());
            assert!(!k.is_object());
        }
        for k in [Kind::Bold, Kind::Link, Kind::Timestamp] {
            assert!(k.is_object());
            assert!(!k.is_element());
        }
    }
}
