//! 交互画布
//!
//! 在静态画布之上叠加指针事件处理：命中测试、变换会话
//! （拖拽/缩放/旋转）、框选与多选编组、自由绘制。
//!
//! 交互状态机按状态建模成带变体的枚举，每个变体只携带自己需要的
//! 字段；会话在指针按下时创建、抬起时消费。一次手势内
//! 移动 → 修改 → 重绘 严格有序，不会与整场重绘交错。

use std::ops::{Deref, DerefMut};

use crate::config::CanvasConfig;
use crate::constants::DRAG_THRESHOLD;
use crate::constants::MIN_SCALE_LIMIT;
use crate::error::CanvasError;
use crate::geometry::Point;
use crate::message::{CanvasEvent, Command, Layer};
use crate::object::{group, Corner, SceneObject};
use crate::render::{CursorStyle, RenderContext, SkiaContext};

use super::free_draw;
use super::static_canvas::StaticCanvas;

/// 变换会话的子动作，由命中的手柄决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAction {
    Drag,
    Scale,
    ScaleX,
    ScaleY,
    Rotate,
}

/// 约束缩放的轴
#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// 会话目标：对象数组里的索引，或活动编组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransformTarget {
    Object(usize),
    Group,
}

/// 指针按下时抓取的手势快照
#[derive(Debug, Clone)]
pub struct TransformSession {
    pub(crate) target: TransformTarget,
    pub action: TransformAction,
    /// 起始缩放
    scale_x: f64,
    scale_y: f64,
    /// 指针相对对象位置的固定偏移
    offset_x: f64,
    offset_y: f64,
    /// 起始指针
    ex: f64,
    ey: f64,
    /// 起始位置与角度
    left: f64,
    top: f64,
    theta: f64,
    /// 是否已超过拖拽阈值
    moved: bool,
}

impl TransformSession {
    fn new(target: TransformTarget, action: TransformAction, obj: &SceneObject, x: f64, y: f64) -> Self {
        Self {
            target,
            action,
            scale_x: obj.scale_x,
            scale_y: obj.scale_y,
            offset_x: x - obj.left,
            offset_y: y - obj.top,
            ex: x,
            ey: y,
            left: obj.left,
            top: obj.top,
            theta: obj.theta(),
            moved: false,
        }
    }
}

/// 橡皮筋框选状态
#[derive(Debug, Clone)]
pub struct GroupSelector {
    /// 拖拽起点
    ex: f64,
    ey: f64,
    /// 当前宽高（可为负）
    left: f64,
    top: f64,
}

/// 交互状态机
pub enum InteractionState {
    Idle,
    Transforming(TransformSession),
    GroupSelecting(GroupSelector),
    Drawing(Vec<Point>),
}

/// 活动编组：成员从对象数组移入编组，丢弃时按原索引放回
pub(crate) struct ActiveGroup {
    pub object: SceneObject,
    original_indices: Vec<usize>,
}

/// 命中目标
enum HitTarget {
    Group(Option<Corner>),
    Object(usize, Option<Corner>),
}

/// 交互画布
pub struct Canvas {
    base: StaticCanvas,
    top_context: Box<dyn RenderContext>,
    pub config: CanvasConfig,
    state: InteractionState,
    active_object: Option<usize>,
    active_group: Option<ActiveGroup>,
    drawing_mode: bool,
}

impl Deref for Canvas {
    type Target = StaticCanvas;

    fn deref(&self) -> &StaticCanvas {
        &self.base
    }
}

impl DerefMut for Canvas {
    fn deref_mut(&mut self) -> &mut StaticCanvas {
        &mut self.base
    }
}

impl Canvas {
    /// 创建带交互层的画布（背景层 + 顶层两个表面）
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Ok(Self {
            base: StaticCanvas::new(width, height)?,
            top_context: Box::new(SkiaContext::new(width, height)?),
            config: CanvasConfig::default(),
            state: InteractionState::Idle,
            active_object: None,
            active_group: None,
            drawing_mode: false,
        })
    }

    /// 自由绘制模式开关（外部切换，不经命中测试）
    pub fn set_drawing_mode(&mut self, enabled: bool) {
        self.drawing_mode = enabled;
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    /// 当前选中对象
    pub fn get_active_object(&self) -> Option<&SceneObject> {
        self.active_object.and_then(|i| self.base.objects.get(i))
    }

    pub(crate) fn active_object_index(&self) -> Option<usize> {
        self.active_object
    }

    /// 当前活动编组
    pub fn get_active_group(&self) -> Option<&SceneObject> {
        self.active_group.as_ref().map(|g| &g.object)
    }

    /// 顶层（交互层）上下文
    pub fn top_context(&self) -> &dyn RenderContext {
        self.top_context.as_ref()
    }

    // ==================== 指针事件 ====================

    /// 指针按下：确定目标并建立会话 / 进入框选 / 开始涂画
    pub fn handle_mouse_down(&mut self, x: f64, y: f64, shift: bool) -> Vec<Command> {
        if self.drawing_mode {
            self.state = InteractionState::Drawing(vec![Point::new(x, y)]);
            return vec![Command::RequestRedraw(Layer::Top)];
        }

        match self.find_target(x, y) {
            None => {
                let mut commands = self.deactivate_all();
                self.state = InteractionState::GroupSelecting(GroupSelector {
                    ex: x,
                    ey: y,
                    left: 0.0,
                    top: 0.0,
                });
                commands.push(Command::RequestRedraw(Layer::All));
                commands
            }
            Some(HitTarget::Group(corner)) => {
                if shift {
                    return self.shift_click_group_member(x, y);
                }
                let Some(group) = self.active_group.as_mut() else {
                    return Vec::new();
                };
                group.object.save_state();
                let action = action_from_corner(&group.object, corner);
                let session =
                    TransformSession::new(TransformTarget::Group, action, &group.object, x, y);
                self.state = InteractionState::Transforming(session);
                vec![Command::RequestRedraw(Layer::All)]
            }
            Some(HitTarget::Object(index, corner)) => {
                if shift {
                    return self.shift_click_object(index, x, y);
                }
                let mut commands = Vec::new();
                if self.active_group.is_some() {
                    commands.extend(self.discard_active_group());
                    // 解散后索引可能变化，重新找目标
                    return match self.find_target(x, y) {
                        Some(HitTarget::Object(index, corner)) => {
                            commands.extend(self.begin_object_transform(index, corner, x, y));
                            commands
                        }
                        _ => {
                            commands.push(Command::RequestRedraw(Layer::All));
                            commands
                        }
                    };
                }
                commands.extend(self.begin_object_transform(index, corner, x, y));
                commands
            }
        }
    }

    fn begin_object_transform(
        &mut self,
        index: usize,
        corner: Option<Corner>,
        x: f64,
        y: f64,
    ) -> Vec<Command> {
        self.set_active_object(index);
        let Some(obj) = self.base.objects.get_mut(index) else {
            return Vec::new();
        };
        obj.save_state();
        let action = action_from_corner(obj, corner);
        let session = TransformSession::new(TransformTarget::Object(index), action, obj, x, y);
        self.state = InteractionState::Transforming(session);
        vec![Command::RequestRedraw(Layer::All)]
    }

    /// 指针移动：悬停时只推导光标（无状态修改），其余按状态推进
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) -> Vec<Command> {
        if matches!(self.state, InteractionState::Idle) {
            return vec![Command::SetCursor(self.hover_cursor(x, y))];
        }
        if let InteractionState::Drawing(points) = &mut self.state {
            points.push(Point::new(x, y));
            return vec![Command::RequestRedraw(Layer::Top)];
        }
        if let InteractionState::GroupSelecting(selector) = &mut self.state {
            selector.left = x - selector.ex;
            selector.top = y - selector.ey;
            return vec![Command::RequestRedraw(Layer::Top)];
        }

        let InteractionState::Transforming(session) = &mut self.state else {
            return Vec::new();
        };
        if !session.moved && !drag_threshold_exceeded(session.ex, session.ey, x, y) {
            return Vec::new();
        }
        session.moved = true;
        let session = session.clone();
        self.apply_transform(&session, x, y)
    }

    /// 指针抬起：提交会话、重算所有角点、结算框选或涂画
    pub fn handle_mouse_up(&mut self, x: f64, y: f64) -> Vec<Command> {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Idle => Vec::new(),
            InteractionState::Drawing(mut points) => {
                points.push(Point::new(x, y));
                if let Some(path) = free_draw::path_from_points(
                    &points,
                    self.config.free_draw_color,
                    self.config.free_draw_width,
                ) {
                    let index = self.base.add(path);
                    self.base.events.push(CanvasEvent::PathCreated { index });
                }
                vec![Command::RequestRedraw(Layer::All)]
            }
            InteractionState::GroupSelecting(selector) => {
                self.resolve_group_selection(&selector);
                vec![Command::RequestRedraw(Layer::All)]
            }
            InteractionState::Transforming(session) => {
                // 重排操作的相交判断依赖新几何，全量重算
                for obj in &mut self.base.objects {
                    obj.set_coords();
                }
                if let Some(group) = &mut self.active_group {
                    group.object.set_coords();
                }
                let modified = match session.target {
                    TransformTarget::Object(index) => self
                        .base
                        .objects
                        .get(index)
                        .filter(|o| o.has_state_changed())
                        .map(|_| Some(index)),
                    TransformTarget::Group => self
                        .active_group
                        .as_ref()
                        .filter(|g| g.object.has_state_changed())
                        .map(|_| None),
                };
                if let Some(index) = modified {
                    self.base.events.push(CanvasEvent::ObjectModified { index });
                }
                vec![Command::RequestRedraw(Layer::All)]
            }
        }
    }

    /// 取消进行中的变换手势，恢复按下时的快照（Escape）
    pub fn cancel_transform(&mut self) -> Vec<Command> {
        let InteractionState::Transforming(session) =
            std::mem::replace(&mut self.state, InteractionState::Idle)
        else {
            return Vec::new();
        };
        match session.target {
            TransformTarget::Object(index) => {
                if let Some(obj) = self.base.objects.get_mut(index) {
                    obj.restore_state();
                    obj.set_coords();
                }
            }
            TransformTarget::Group => {
                if let Some(group) = &mut self.active_group {
                    group.object.restore_state();
                    group.object.set_coords();
                }
            }
        }
        vec![Command::RequestRedraw(Layer::All)]
    }

    // ==================== 命中测试 ====================

    /// 命中顺序：活动编组手柄/内部 → 活动对象手柄 → 自顶向下对象
    fn find_target(&self, x: f64, y: f64) -> Option<HitTarget> {
        if let Some(group) = &self.active_group {
            if let Some(corner) = group.object.find_target_corner(x, y) {
                return Some(HitTarget::Group(Some(corner)));
            }
            if group.object.contains_point(x, y) {
                return Some(HitTarget::Group(None));
            }
        }
        if let Some(index) = self.active_object {
            if let Some(obj) = self.base.objects.get(index) {
                // 手柄可以伸出包围盒，活动对象先查手柄
                if let Some(corner) = obj.find_target_corner(x, y) {
                    return Some(HitTarget::Object(index, Some(corner)));
                }
            }
        }
        for (index, obj) in self.base.objects.iter().enumerate().rev() {
            if obj.selectable && obj.contains_point(x, y) {
                return Some(HitTarget::Object(index, None));
            }
        }
        None
    }

    /// 悬停光标，纯推导、无状态修改
    pub fn hover_cursor(&self, x: f64, y: f64) -> CursorStyle {
        if self.drawing_mode {
            return CursorStyle::Crosshair;
        }
        match self.find_target(x, y) {
            Some(HitTarget::Group(Some(corner)) | HitTarget::Object(_, Some(corner))) => {
                corner_cursor(corner)
            }
            Some(_) => CursorStyle::Move,
            None => CursorStyle::Default,
        }
    }

    // ==================== 变换应用 ====================

    fn apply_transform(&mut self, session: &TransformSession, x: f64, y: f64) -> Vec<Command> {
        let target: &mut SceneObject = match session.target {
            TransformTarget::Object(index) => match self.base.objects.get_mut(index) {
                Some(obj) => obj,
                None => return Vec::new(),
            },
            TransformTarget::Group => match &mut self.active_group {
                Some(group) => &mut group.object,
                None => return Vec::new(),
            },
        };
        match session.action {
            TransformAction::Drag => translate_object(target, session, x, y),
            TransformAction::Scale => scale_object(target, session, x, y, None),
            TransformAction::ScaleX => scale_object(target, session, x, y, Some(Axis::X)),
            TransformAction::ScaleY => scale_object(target, session, x, y, Some(Axis::Y)),
            TransformAction::Rotate => rotate_object(target, session, x, y),
        }
        vec![Command::RequestRedraw(Layer::All)]
    }

    // ==================== 选择管理 ====================

    /// 设为唯一活动对象
    pub fn set_active_object(&mut self, index: usize) {
        for obj in &mut self.base.objects {
            obj.active = false;
        }
        if let Some(obj) = self.base.objects.get_mut(index) {
            obj.active = true;
            obj.set_coords();
            self.active_object = Some(index);
            self.base.events.push(CanvasEvent::ObjectSelected { index });
        }
    }

    /// 清除活动对象与编组
    pub fn deactivate_all(&mut self) -> Vec<Command> {
        let mut cleared = false;
        if self.active_group.is_some() {
            self.discard_active_group_silent();
            cleared = true;
        }
        if let Some(index) = self.active_object.take() {
            if let Some(obj) = self.base.objects.get_mut(index) {
                obj.active = false;
            }
            cleared = true;
        }
        if cleared {
            self.base.events.push(CanvasEvent::SelectionCleared);
        }
        Vec::new()
    }

    /// 解散活动编组：施加编组变换并按原索引放回成员
    pub fn discard_active_group(&mut self) -> Vec<Command> {
        if self.active_group.is_some() {
            self.discard_active_group_silent();
            self.base.events.push(CanvasEvent::SelectionCleared);
        }
        Vec::new()
    }

    fn discard_active_group_silent(&mut self) {
        let Some(ActiveGroup {
            object,
            original_indices,
        }) = self.active_group.take()
        else {
            return;
        };
        let members = group::destroy_group(object);
        for (member, index) in members.into_iter().zip(original_indices) {
            let index = index.min(self.base.objects.len());
            self.base.objects.insert(index, member);
        }
    }

    /// 由升序索引集合成活动编组
    fn create_active_group(&mut self, indices: Vec<usize>) {
        if indices.len() < 2 {
            if let Some(&index) = indices.first() {
                self.set_active_object(index);
            }
            return;
        }
        for obj in &mut self.base.objects {
            obj.active = false;
        }
        self.active_object = None;
        let mut members = Vec::with_capacity(indices.len());
        for &index in indices.iter().rev() {
            members.push(self.base.objects.remove(index));
        }
        members.reverse();
        let Ok(mut object) = group::make_group(members) else {
            return;
        };
        object.active = true;
        object.set_coords();
        self.base.events.push(CanvasEvent::SelectionCreated {
            member_count: indices.len(),
        });
        self.active_group = Some(ActiveGroup {
            object,
            original_indices: indices,
        });
    }

    /// 框选结算：相交或完全包含的可选对象入选
    fn resolve_group_selection(&mut self, selector: &GroupSelector) {
        if selector.left == 0.0 && selector.top == 0.0 {
            return;
        }
        let p1 = Point::new(
            selector.ex.min(selector.ex + selector.left),
            selector.ey.min(selector.ey + selector.top),
        );
        let p2 = Point::new(
            selector.ex.max(selector.ex + selector.left),
            selector.ey.max(selector.ey + selector.top),
        );
        let mut hits = Vec::new();
        for (index, obj) in self.base.objects.iter_mut().enumerate() {
            if !obj.selectable {
                continue;
            }
            obj.set_coords();
            if obj.intersects_with_rect(&p1, &p2) || obj.is_contained_within_rect(&p1, &p2) {
                hits.push(index);
            }
        }
        match hits.len() {
            0 => {}
            1 => self.set_active_object(hits[0]),
            _ => self.create_active_group(hits),
        }
    }

    // ==================== shift 合并/拆分 ====================

    /// shift 点击编组成员：移出该成员，剩一个则解散编组
    fn shift_click_group_member(&mut self, x: f64, y: f64) -> Vec<Command> {
        let Some(ActiveGroup {
            object,
            original_indices,
        }) = self.active_group.take()
        else {
            return Vec::new();
        };
        // 恢复绝对坐标后才能做指针命中
        let members = group::destroy_group(object);
        let mut hit = None;
        for (j, member) in members.iter().enumerate().rev() {
            if member.contains_point(x, y) {
                hit = Some(j);
                break;
            }
        }
        for (member, index) in members.into_iter().zip(original_indices.iter().copied()) {
            let index = index.min(self.base.objects.len());
            self.base.objects.insert(index, member);
        }
        match hit {
            None => {
                self.base.events.push(CanvasEvent::SelectionCleared);
            }
            Some(j) => {
                let removed = original_indices[j];
                let remaining: Vec<usize> = original_indices
                    .into_iter()
                    .filter(|&i| i != removed)
                    .collect();
                if remaining.len() >= 2 {
                    self.create_active_group(remaining);
                } else if let Some(&index) = remaining.first() {
                    self.set_active_object(index);
                }
            }
        }
        vec![Command::RequestRedraw(Layer::All)]
    }

    /// shift 点击普通对象：并入编组，或与当前活动对象合成编组
    fn shift_click_object(&mut self, index: usize, _x: f64, _y: f64) -> Vec<Command> {
        if self.active_group.is_some() {
            // 标记新成员，解散后按标记重建集合
            if let Some(obj) = self.base.objects.get_mut(index) {
                obj.active = true;
            }
            let Some(ActiveGroup {
                object,
                original_indices,
            }) = self.active_group.take()
            else {
                return Vec::new();
            };
            let members = group::destroy_group(object);
            for (member, i) in members.into_iter().zip(original_indices.iter().copied()) {
                let i = i.min(self.base.objects.len());
                self.base.objects.insert(i, member);
            }
            let indices: Vec<usize> = self
                .base
                .objects
                .iter()
                .enumerate()
                .filter(|(i, obj)| obj.active || original_indices.contains(i))
                .map(|(i, _)| i)
                .collect();
            self.create_active_group(indices);
            return vec![Command::RequestRedraw(Layer::All)];
        }
        match self.active_object {
            Some(current) if current != index => {
                let indices = if current < index {
                    vec![current, index]
                } else {
                    vec![index, current]
                };
                self.active_object = None;
                self.create_active_group(indices);
            }
            _ => self.set_active_object(index),
        }
        vec![Command::RequestRedraw(Layer::All)]
    }

    // ==================== 渲染 ====================

    /// 整场重绘：背景层合成 + 选择装饰
    pub fn render_all(&mut self) {
        let group = self.active_group.as_mut().map(|g| &mut g.object);
        self.base.render_scene(group);
        self.draw_selection_chrome();
    }

    /// 顶层重绘：橡皮筋选框与涂画预览
    pub fn render_top(&mut self) {
        let ctx = self.top_context.as_mut();
        ctx.clear(None);
        match &self.state {
            InteractionState::GroupSelecting(selector) => {
                let left = selector.ex.min(selector.ex + selector.left);
                let top = selector.ey.min(selector.ey + selector.top);
                let width = selector.left.abs();
                let height = selector.top.abs();
                ctx.save();
                ctx.set_fill(self.config.selection_color);
                ctx.fill_rect(left, top, width, height);
                ctx.set_stroke(self.config.selection_border_color);
                ctx.set_line_width(self.config.selection_line_width);
                ctx.set_line_dash(&self.config.selection_dash);
                ctx.stroke_rect(left, top, width, height);
                ctx.restore();
            }
            InteractionState::Drawing(points) => {
                if points.len() >= 2 {
                    ctx.save();
                    ctx.begin_path();
                    ctx.move_to(points[0].x, points[0].y);
                    for p in &points[1..] {
                        ctx.line_to(p.x, p.y);
                    }
                    ctx.set_stroke(self.config.free_draw_color);
                    ctx.set_line_width(self.config.free_draw_width);
                    ctx.stroke();
                    ctx.restore();
                }
            }
            _ => {}
        }
    }

    fn draw_selection_chrome(&mut self) {
        let config = self.config.clone();
        if let Some(index) = self.active_object {
            let StaticCanvas {
                context, objects, ..
            } = &mut self.base;
            if let Some(obj) = objects.get(index) {
                draw_object_chrome(context.as_mut(), obj, &config);
            }
        }
        if let Some(group) = &self.active_group {
            draw_object_chrome(self.base.context.as_mut(), &group.object, &config);
        }
    }
}

/// 手柄 → 子动作。中点手柄是轴约束缩放；四角在有旋转手柄时缩放、
/// 否则旋转；旋转手柄总是旋转。
fn action_from_corner(obj: &SceneObject, corner: Option<Corner>) -> TransformAction {
    match corner {
        None => TransformAction::Drag,
        Some(Corner::MidLeft | Corner::MidRight) => TransformAction::ScaleX,
        Some(Corner::MidTop | Corner::MidBottom) => TransformAction::ScaleY,
        Some(Corner::RotateTop | Corner::RotateBottom) => TransformAction::Rotate,
        Some(_) => {
            if obj.has_rotating_point {
                TransformAction::Scale
            } else {
                TransformAction::Rotate
            }
        }
    }
}

fn corner_cursor(corner: Corner) -> CursorStyle {
    match corner {
        Corner::TopLeft | Corner::BottomRight => CursorStyle::ResizeNwSe,
        Corner::TopRight | Corner::BottomLeft => CursorStyle::ResizeNeSw,
        Corner::MidTop | Corner::MidBottom => CursorStyle::ResizeNs,
        Corner::MidLeft | Corner::MidRight => CursorStyle::ResizeEw,
        Corner::RotateTop | Corner::RotateBottom => CursorStyle::Rotate,
    }
}

fn drag_threshold_exceeded(start_x: f64, start_y: f64, x: f64, y: f64) -> bool {
    (x - start_x).abs() > DRAG_THRESHOLD || (y - start_y).abs() > DRAG_THRESHOLD
}

/// 平移：位置 = 指针 − 按下时偏移；两轴可独立锁定
fn translate_object(obj: &mut SceneObject, session: &TransformSession, x: f64, y: f64) {
    if !obj.lock_movement_x {
        obj.left = x - session.offset_x;
    }
    if !obj.lock_movement_y {
        obj.top = y - session.offset_y;
    }
    obj.invalidate_coords();
}

/// 缩放：新系数 = 起始系数 × (当前指针到对象位置的距离 ÷ 起始距离)。
/// 锚点即对象位置，缩放天然围绕中心。
fn scale_object(
    obj: &mut SceneObject,
    session: &TransformSession,
    x: f64,
    y: f64,
    by: Option<Axis>,
) {
    if obj.lock_scaling_x && obj.lock_scaling_y {
        return;
    }
    let last_len = (session.ex - session.left).hypot(session.ey - session.top);
    let cur_len = (x - session.left).hypot(y - session.top);
    if last_len == 0.0 {
        return;
    }
    let ratio = cur_len / last_len;
    match by {
        None => {
            if !obj.lock_scaling_x {
                obj.scale_x = (session.scale_x * ratio).max(MIN_SCALE_LIMIT);
            }
            if !obj.lock_scaling_y {
                obj.scale_y = (session.scale_y * ratio).max(MIN_SCALE_LIMIT);
            }
        }
        Some(Axis::X) => {
            if !obj.lock_scaling_x {
                obj.scale_x = (session.scale_x * ratio).max(MIN_SCALE_LIMIT);
            }
        }
        Some(Axis::Y) => {
            if !obj.lock_scaling_y {
                obj.scale_y = (session.scale_y * ratio).max(MIN_SCALE_LIMIT);
            }
        }
    }
    obj.invalidate_coords();
}

/// 旋转：θ = 当前指针角 − 起始指针角 + 起始 θ（增量式，只取决于
/// 起止角度，与采样次数无关）
fn rotate_object(obj: &mut SceneObject, session: &TransformSession, x: f64, y: f64) {
    if obj.lock_rotation {
        return;
    }
    let cur = (y - session.top).atan2(x - session.left);
    let start = (session.ey - session.top).atan2(session.ex - session.left);
    obj.set_theta(cur - start + session.theta);
}

/// 活动对象/编组的边框与手柄
fn draw_object_chrome(ctx: &mut dyn RenderContext, obj: &SceneObject, config: &CanvasConfig) {
    ctx.save();
    ctx.set_global_alpha(1.0);
    ctx.set_line_dash(&[]);
    if obj.has_borders {
        let w = obj.get_width();
        let h = obj.get_height();
        ctx.save();
        ctx.translate(obj.left, obj.top);
        ctx.rotate(obj.theta());
        ctx.set_stroke(config.border_color);
        ctx.set_line_width(1.0);
        ctx.stroke_rect(-w / 2.0, -h / 2.0, w, h);
        ctx.restore();
    }
    if obj.has_controls {
        if let Some(coords) = obj.corner_coords() {
            for corner in [
                Corner::TopLeft,
                Corner::TopRight,
                Corner::BottomRight,
                Corner::BottomLeft,
                Corner::MidLeft,
                Corner::MidTop,
                Corner::MidRight,
                Corner::MidBottom,
                Corner::RotateTop,
                Corner::RotateBottom,
            ] {
                if matches!(corner, Corner::RotateTop | Corner::RotateBottom)
                    && !obj.has_rotating_point
                {
                    continue;
                }
                let quad = coords.control(corner).corner;
                ctx.begin_path();
                ctx.move_to(quad[0].x, quad[0].y);
                ctx.line_to(quad[1].x, quad[1].y);
                ctx.line_to(quad[2].x, quad[2].y);
                ctx.line_to(quad[3].x, quad[3].y);
                ctx.close_path();
                ctx.set_fill(config.corner_color);
                ctx.fill();
                ctx.set_stroke(config.corner_border_color);
                ctx.set_line_width(1.0);
                ctx.stroke();
            }
        }
    }
    ctx.restore();
}

// ==================== 单元测试 ====================
