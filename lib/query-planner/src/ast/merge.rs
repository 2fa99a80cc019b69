use super::selection_item::SelectionItem;
use super::selection_set::{FieldSelection, InlineFragmentSelection, SelectionSet};

/// Merges `additions` into `base` by response key (fields) and type condition
/// (inline fragments), recursing into matching sub-selections. Document order
/// of `base` is preserved, new selections are appended.
///
/// A selection that exists in both and is client-visible on either side stays
/// client-visible in the result.
pub fn merge_selection_sets(base: &SelectionSet, additions: &SelectionSet) -> SelectionSet {
    let mut items = base.items.clone();

    for addition in &additions.items {
        match addition {
            SelectionItem::Field(new_field) => {
                let existing = items.iter_mut().find_map(|item| match item {
                    SelectionItem::Field(field)
                        if field.response_key() == new_field.response_key()
                            && field.name == new_field.name
                            && field.arguments == new_field.arguments =>
                    {
                        Some(field)
                    }
                    _ => None,
                });

                match existing {
                    Some(field) => {
                        field.requirement_only = field.requirement_only && new_field.requirement_only;
                        field.selections = merge_selection_sets(&field.selections, &new_field.selections);
                    }
                    None => items.push(SelectionItem::Field(new_field.clone())),
                }
            }
            SelectionItem::InlineFragment(new_fragment) => {
                let existing = items.iter_mut().find_map(|item| match item {
                    SelectionItem::InlineFragment(fragment)
                        if fragment.type_condition == new_fragment.type_condition =>
                    {
                        Some(fragment)
                    }
                    _ => None,
                });

                match existing {
                    Some(fragment) => {
                        fragment.requirement_only =
                            fragment.requirement_only && new_fragment.requirement_only;
                        fragment.selections =
                            merge_selection_sets(&fragment.selections, &new_fragment.selections);
                    }
                    None => items.push(SelectionItem::InlineFragment(new_fragment.clone())),
                }
            }
        }
    }

    SelectionSet { items }
}

/// Strips `requirement_only` selections, yielding the client-visible shape of
/// a planned operation. Executors use this to decide what may be merged into
/// the response.
pub fn strip_requirement_selections(selection_set: &SelectionSet) -> SelectionSet {
    let mut items = Vec::with_capacity(selection_set.items.len());

    for item in &selection_set.items {
        if item.is_requirement_only() {
            continue;
        }

        match item {
            SelectionItem::Field(field) => {
                items.push(SelectionItem::Field(FieldSelection {
                    selections: strip_requirement_selections(&field.selections),
                    ..field.clone()
                }));
            }
            SelectionItem::InlineFragment(fragment) => {
                items.push(SelectionItem::InlineFragment(InlineFragmentSelection {
                    selections: strip_requirement_selections(&fragment.selections),
                    ..fragment.clone()
                }));
            }
        }
    }

    SelectionSet { items }
}
