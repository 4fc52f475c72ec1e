// 全局消息系统
//
// 定义画布与宿主之间通信的事件和命令类型。
// 采用事件驱动的架构，宿主轮询事件队列而不是注册回调。

use crate::render::CursorStyle;

/// 重绘目标图层
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// 仅交互层（拖拽过程中的临时绘制）
    Top,
    /// 背景层与交互层全部重绘
    All,
}

/// 画布事件，由交互控制器在状态变化时入队
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// 对象加入场景
    ObjectAdded { index: usize },
    /// 对象从场景移除
    ObjectRemoved { index: usize },
    /// 手势结束时目标状态确实发生了变化；None 表示活动编组
    ObjectModified { index: Option<usize> },
    /// 单个对象被选中
    ObjectSelected { index: usize },
    /// 框选或 shift 点选生成了活动编组
    SelectionCreated { member_count: usize },
    /// 活动对象/编组被清除
    SelectionCleared,
    /// 自由绘制完成并生成了路径对象
    PathCreated { index: usize },
    /// 异步图像源加载完成
    ImageLoaded { src: String },
    /// 一次完整渲染结束（宿主可在此统计帧率）
    AfterRender,
}

/// 命令枚举，指示宿主需要执行的操作
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 请求重绘指定图层
    RequestRedraw(Layer),
    /// 更新鼠标光标
    SetCursor(CursorStyle),
    /// 无操作
    None,
}
